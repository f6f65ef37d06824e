use serde::{Deserialize, Serialize};

use crate::{Error, listing::Searchable};

/// The backend's identifier for a bank account.
pub type AccountId = String;

/// A bank account registered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account holder as registered with the bank.
    pub holder_name: String,
    pub account_number: String,
    /// The branch code, e.g. "HDFC0001234".
    pub ifsc_code: String,
    #[serde(default)]
    pub balance: f64,
    /// Whether transfers and fund requests use this account unless told otherwise.
    #[serde(default)]
    pub is_default: bool,
}

impl BankAccount {
    /// The account number with all but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let visible: String = self
            .account_number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        format!("••••{visible}")
    }
}

impl Searchable for BankAccount {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.holder_name.as_str(),
            self.account_number.as_str(),
            self.ifsc_code.as_str(),
        ]
    }
}

/// The summary of an account embedded in transfer requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub id: AccountId,
    #[serde(default)]
    pub holder_name: String,
    #[serde(default)]
    pub account_number: String,
}

impl From<&BankAccount> for AccountRef {
    fn from(account: &BankAccount) -> Self {
        Self {
            id: account.id.clone(),
            holder_name: account.holder_name.clone(),
            account_number: account.account_number.clone(),
        }
    }
}

/// The validated fields for creating or updating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
}

impl AccountDraft {
    /// Trim and check the fields of the account form.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the holder name is blank, the account
    /// number is not 9 to 18 digits, or the IFSC code is not four letters,
    /// a zero, then six letters or digits.
    pub fn new(holder_name: &str, account_number: &str, ifsc_code: &str) -> Result<Self, Error> {
        let holder_name = holder_name.trim();
        let account_number: String = account_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let ifsc_code = ifsc_code.trim().to_ascii_uppercase();

        if holder_name.is_empty() {
            return Err(Error::Validation(
                "Enter the name of the account holder.".to_owned(),
            ));
        }

        if !(9..=18).contains(&account_number.len())
            || !account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(Error::Validation(
                "Account numbers are 9 to 18 digits long.".to_owned(),
            ));
        }

        if !is_valid_ifsc(&ifsc_code) {
            return Err(Error::Validation(format!(
                "\"{ifsc_code}\" is not a valid IFSC code, e.g. HDFC0001234."
            )));
        }

        Ok(Self {
            holder_name: holder_name.to_owned(),
            account_number,
            ifsc_code,
        })
    }
}

fn is_valid_ifsc(code: &str) -> bool {
    let bytes = code.as_bytes();

    bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..].iter().all(u8::is_ascii_alphanumeric)
}

/// Make the account `id` the only default account.
///
/// All flags are cleared and the target set in one pass, so the list never
/// holds two defaults.
///
/// # Errors
///
/// Returns [Error::NotFound] and leaves `accounts` untouched if no account has `id`.
pub fn set_default_account(accounts: &mut [BankAccount], id: &str) -> Result<(), Error> {
    if !accounts.iter().any(|account| account.id == id) {
        return Err(Error::NotFound);
    }

    for account in accounts.iter_mut() {
        account.is_default = account.id == id;
    }

    Ok(())
}

/// The account used when the user does not pick one.
pub fn default_account(accounts: &[BankAccount]) -> Option<&BankAccount> {
    accounts.iter().find(|account| account.is_default)
}

pub fn total_balance(accounts: &[BankAccount]) -> f64 {
    accounts.iter().map(|account| account.balance).sum()
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{AccountDraft, BankAccount, set_default_account, total_balance};

    fn account(id: &str, is_default: bool) -> BankAccount {
        BankAccount {
            id: id.to_owned(),
            holder_name: "Asha Rao".to_owned(),
            account_number: "123456789012".to_owned(),
            ifsc_code: "HDFC0001234".to_owned(),
            balance: 100.0,
            is_default,
        }
    }

    #[test]
    fn set_default_leaves_exactly_one_default() {
        let mut accounts = vec![
            account("a", true),
            account("b", false),
            account("c", true),
        ];

        set_default_account(&mut accounts, "b").unwrap();

        let defaults: Vec<_> = accounts
            .iter()
            .filter(|account| account.is_default)
            .map(|account| account.id.as_str())
            .collect();
        assert_eq!(defaults, ["b"]);
    }

    #[test]
    fn set_default_is_idempotent() {
        let mut accounts = vec![account("a", true), account("b", false)];

        set_default_account(&mut accounts, "a").unwrap();
        set_default_account(&mut accounts, "a").unwrap();

        assert!(accounts[0].is_default);
        assert!(!accounts[1].is_default);
    }

    #[test]
    fn set_default_on_unknown_id_changes_nothing() {
        let mut accounts = vec![account("a", true), account("b", false)];
        let before = accounts.clone();

        let got = set_default_account(&mut accounts, "zzz");

        assert_eq!(got, Err(Error::NotFound));
        assert_eq!(accounts, before);
    }

    #[test]
    fn set_default_on_empty_list_is_not_found() {
        assert_eq!(set_default_account(&mut [], "a"), Err(Error::NotFound));
    }

    #[test]
    fn draft_normalizes_fields() {
        let got = AccountDraft::new("  Asha Rao ", "1234 5678 9012", "hdfc0001234").unwrap();

        assert_eq!(
            got,
            AccountDraft {
                holder_name: "Asha Rao".to_owned(),
                account_number: "123456789012".to_owned(),
                ifsc_code: "HDFC0001234".to_owned(),
            }
        );
    }

    #[test]
    fn draft_rejects_bad_input() {
        assert!(matches!(
            AccountDraft::new(" ", "123456789", "HDFC0001234"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            AccountDraft::new("A", "12AB56789", "HDFC0001234"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            AccountDraft::new("A", "123456789", "HDFC1001234"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn masks_account_number() {
        assert_eq!(account("a", false).masked_number(), "••••9012");
    }

    #[test]
    fn sums_balances() {
        assert_eq!(total_balance(&[account("a", false), account("b", true)]), 200.0);
    }
}
