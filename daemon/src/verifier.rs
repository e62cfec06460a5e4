//! Human verification for the command line.

use async_trait::async_trait;
use ballot_gate::{HumanVerifier, VerificationToken};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Length of the code the visitor is asked to type back.
const CODE_LEN: usize = 6;

/// Accepts a token obtained out of band (`--verification-token`).
pub struct StaticVerifier {
    token: VerificationToken,
}

impl StaticVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: VerificationToken::new(token),
        }
    }
}

#[async_trait]
impl HumanVerifier for StaticVerifier {
    fn name(&self) -> &str {
        "static-token"
    }

    async fn challenge(&self) -> Option<VerificationToken> {
        Some(self.token.clone())
    }
}

/// Shows a random code on stdout and asks for it on stdin.
pub struct ConsoleVerifier;

#[async_trait]
impl HumanVerifier for ConsoleVerifier {
    fn name(&self) -> &str {
        "console-prompt"
    }

    async fn challenge(&self) -> Option<VerificationToken> {
        let code = match ballot_identity::generate_token() {
            Ok(token) => token[..CODE_LEN].to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "could not generate verification code");
                return None;
            }
        };

        let mut stdout = tokio::io::stdout();
        let prompt = format!("Type {code} to confirm you are human: ");
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return None;
        }

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = stdin.read_line(&mut answer).await {
            tracing::debug!(error = %e, "failed to read verification answer");
            return None;
        }
        answer_matches(&code, &answer).then(|| VerificationToken::new(code))
    }
}

fn answer_matches(code: &str, answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_is_trimmed_and_case_insensitive() {
        assert!(answer_matches("a1b2c3", "A1B2C3\n"));
        assert!(answer_matches("a1b2c3", "  a1b2c3 "));
        assert!(!answer_matches("a1b2c3", "a1b2c"));
        assert!(!answer_matches("a1b2c3", ""));
    }

    #[tokio::test]
    async fn static_verifier_returns_its_token() {
        let verifier = StaticVerifier::new("tok");
        assert_eq!(verifier.challenge().await, Some(VerificationToken::new("tok")));
    }
}
