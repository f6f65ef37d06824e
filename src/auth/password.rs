//! The strength check for new passwords.
//!
//! The backend stores the password, this only stops obviously weak ones
//! before they are sent.

use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// The minimum number of characters accepted by the password inputs.
pub const PASSWORD_INPUT_MIN_LENGTH: u8 = 12;

/// Check that `password` is hard to guess.
///
/// `user_inputs` are words the user entered elsewhere on the form, such as
/// their name and email, which make a password easier to guess.
///
/// # Errors
///
/// Returns [Error::TooWeak] with zxcvbn's suggestions if the password scores
/// below three out of four.
pub fn check_password_strength(password: &str, user_inputs: &[&str]) -> Result<(), Error> {
    let password_analysis = zxcvbn(password, user_inputs);

    match password_analysis.score() {
        Score::Three | Score::Four => Ok(()),
        _ => Err(Error::TooWeak(
            password_analysis
                .feedback()
                .unwrap_or(&Feedback::default())
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::check_password_strength;

    #[test]
    fn rejects_common_password() {
        let result = check_password_strength("password123", &[]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn rejects_password_built_from_user_details() {
        let result = check_password_strength("asha@bankdesk.test", &["asha@bankdesk.test"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn accepts_long_passphrase() {
        assert_eq!(
            check_password_strength("correct horse battery staple ledger", &[]),
            Ok(())
        );
    }
}
