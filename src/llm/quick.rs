//! Canned responses that bypass the provider chain entirely.
//!
//! Cheap string lookups for greetings and a handful of common
//! questions, answered before any provider spends time or tokens.

const QUICK_ANSWERS: &[(&str, &str)] = &[
    (
        "what is ai",
        "AI (Artificial Intelligence) is technology that enables machines to perform tasks that typically require human intelligence, such as learning, reasoning, and problem-solving.",
    ),
    (
        "what is artificial intelligence",
        "Artificial Intelligence (AI) is a branch of computer science that aims to create intelligent machines capable of performing tasks that typically require human intelligence.",
    ),
    (
        "hello",
        "Hello! I'm Verixa AI, your intelligent search assistant. How can I help you today?",
    ),
    (
        "hi",
        "Hi there! I'm here to help you find information and answer your questions. What would you like to know?",
    ),
    (
        "help",
        "I can help you search for information, answer questions, and provide detailed explanations on various topics. Just ask me anything!",
    ),
];

const GREETINGS: &[(&str, &str)] = &[
    ("hi", "Hi! How's it going?"),
    ("hello", "Hello! How are you doing today?"),
    ("hey", "Hey there! What's up?"),
    ("good morning", "Good morning! Hope you're having a great day!"),
    ("good afternoon", "Good afternoon! How's your day going?"),
    ("good evening", "Good evening! How was your day?"),
    ("how are you", "I'm doing great! How about you?"),
    ("whats up", "Not much, just here to help! What's on your mind?"),
    ("sup", "Hey! What's going on?"),
    ("namaste", "Namaste! Kaise hain aap?"),
    ("kaise ho", "Main theek hoon! Tum kaise ho?"),
    (
        "kaise ho dost",
        "Main bilkul theek hoon dost! Tum batao, kya haal hai?",
    ),
    ("kya haal hai", "Sab badhiya hai! Tumhara kya haal?"),
    ("adab", "Adab! Kaise hain aap?"),
    ("sat sri akal", "Sat Sri Akal! Kaise ho ji?"),
    ("ram ram", "Ram Ram! Kaise hain?"),
    ("jai hind", "Jai Hind! Kaise ho bhai?"),
    ("yo", "Yo! What's happening?"),
    ("wassup", "What's up! How's it going?"),
    ("howdy", "Howdy! Nice to see you!"),
    ("hola", "Hola! ¿Cómo estás?"),
];

const QUESTION_ANSWERS: &[(&str, &str)] = &[
    (
        "ai ke bare mai btao",
        "AI (Artificial Intelligence) ek advanced technology hai jo machines ko human-like intelligence deti hai. Ye machine learning, deep learning, aur neural networks ka use karke complex problems solve karti hai. AI aaj kal har field mein use ho raha hai - healthcare, education, business, entertainment, aur daily life mein.",
    ),
    (
        "ai kya hai",
        "AI matlab Artificial Intelligence hai - ye ek technology hai jo computers ko insaan ki tarah sochne aur decisions lene ki capability deti hai.",
    ),
    (
        "artificial intelligence kya hai",
        "Artificial Intelligence ek computer science field hai jo machines ko intelligent behavior sikhane par focus karti hai. Isme machine learning, robotics, aur cognitive computing shamil hai.",
    ),
    (
        "machine learning kya hai",
        "Machine Learning AI ka ek part hai jisme computers data se automatically learn karte hain bina explicitly programmed hue. Ye patterns identify karke predictions banata hai.",
    ),
];

/// Canned answer for a query, if one applies.
pub fn quick_answer(query: &str) -> Option<String> {
    let lower = query.to_lowercase().trim().to_string();

    if let Some((_, answer)) = QUICK_ANSWERS.iter().find(|(pattern, _)| *pattern == lower) {
        return Some(answer.to_string());
    }

    if lower.chars().count() < 3 {
        return Some(
            "Could you please provide a more detailed question? I'm here to help!".to_string(),
        );
    }

    if let Some((_, answer)) = GREETINGS.iter().find(|(pattern, _)| *pattern == lower) {
        return Some(answer.to_string());
    }

    if let Some((_, answer)) = QUESTION_ANSWERS
        .iter()
        .find(|(pattern, _)| *pattern == lower)
    {
        return Some(answer.to_string());
    }

    // Loose greeting match: the query contains the greeting and is not
    // much longer than it.
    for (pattern, answer) in GREETINGS {
        if lower.contains(pattern) && lower.chars().count() <= pattern.chars().count() + 10 {
            return Some(answer.to_string());
        }
    }

    for (pattern, answer) in QUESTION_ANSWERS {
        let first_word = pattern.split(' ').next().unwrap_or(pattern);
        if lower.contains(first_word) && lower.contains("ai") {
            return Some(answer.to_string());
        }
    }

    None
}
