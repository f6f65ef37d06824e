use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{listing::Searchable, request::RequestStatus, user::UserRef};

/// The backend's identifier for a transaction.
pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[serde(alias = "credit")]
    Credit,
    #[serde(alias = "debit")]
    Debit,
    #[serde(alias = "fund", alias = "DEPOSIT")]
    Fund,
    #[serde(alias = "transfer", alias = "WITHDRAWAL")]
    Transfer,
}

impl TransactionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
            Self::Fund => "Fund",
            Self::Transfer => "Transfer",
        }
    }

    /// Whether money leaves the user's accounts.
    pub fn is_outgoing(self) -> bool {
        matches!(self, Self::Debit | Self::Transfer)
    }
}

/// A movement of money as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(alias = "type")]
    pub transaction_type: TransactionType,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.description.as_str()];

        if let Some(user) = &self.user {
            fields.push(&user.name);
            fields.push(&user.email);
        }

        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.status.as_query_value())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{listing::ListFilter, request::RequestStatus};

    use super::{Transaction, TransactionType};

    fn transaction(id: &str, description: &str, status: RequestStatus) -> Transaction {
        Transaction {
            id: id.to_owned(),
            description: description.to_owned(),
            amount: 100.0,
            transaction_type: TransactionType::Credit,
            status,
            created_at: datetime!(2025-01-01 00:00 UTC),
            user: None,
        }
    }

    #[test]
    fn search_for_sal_finds_salary_only() {
        let transactions = vec![
            transaction("T1", "Rent", RequestStatus::Pending),
            transaction("T2", "Salary", RequestStatus::Completed),
        ];

        let got = ListFilter::new("sal", "").apply(&transactions);

        assert_eq!(got, [&transactions[1]]);
    }

    #[test]
    fn status_filter_matches_category() {
        let transactions = vec![
            transaction("T1", "Rent", RequestStatus::Pending),
            transaction("T2", "Salary", RequestStatus::Completed),
        ];

        let got = ListFilter::new("", "PENDING").apply(&transactions);

        assert_eq!(got, [&transactions[0]]);
    }

    #[test]
    fn deserializes_backend_transaction() {
        let json = r#"{
            "id": "txn-1",
            "description": "Fund request fr-1",
            "amount": 2500.5,
            "type": "FUND",
            "status": "APPROVED",
            "createdAt": "2025-02-03T04:05:06Z",
            "user": {"id": "u-1", "name": "Asha", "email": "asha@example.com"}
        }"#;

        let got: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(got.transaction_type, TransactionType::Fund);
        assert_eq!(got.status, RequestStatus::Completed);
        assert_eq!(got.user.unwrap().name, "Asha");
    }
}
