//! Confirmation capability required before destructive operations.
//!
//! The core never shows dialogs; callers supply the prompt.

/// Answers a yes/no question posed before a destructive operation.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::Confirm;

    #[test]
    fn closures_receive_the_prompt() {
        let mut seen = Vec::new();
        let mut prompt = |message: &str| {
            seen.push(message.to_string());
            false
        };
        assert!(!prompt.confirm("delete?"));
        assert_eq!(seen, vec!["delete?".to_string()]);
    }
}
