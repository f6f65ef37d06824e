use std::fmt::{self, Display};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

use crate::{
    account::{AccountId, AccountRef},
    html::DEFAULT_CURRENCY,
    listing::Searchable,
    user::{UserId, UserRef},
};

use super::workflow::ReviewState;

/// The backend's identifier for a fund or transfer request.
pub type RequestId = String;

/// The two kinds of request that go through review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Fund,
    Transfer,
}

impl RequestKind {
    pub const ALL: [RequestKind; 2] = [RequestKind::Fund, RequestKind::Transfer];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Fund => "fund",
            Self::Transfer => "transfer",
        }
    }

    /// The backend collection path.
    pub fn api_path(self) -> &'static str {
        match self {
            Self::Fund => "/fund-requests",
            Self::Transfer => "/transfer-requests",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fund => "Fund requests",
            Self::Transfer => "Transfer requests",
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

/// A user's request to deposit funds, subject to admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How the user paid, e.g. "UPI" or "NEFT".
    #[serde(default)]
    pub payment_method: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub review: ReviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// A user's request to move funds out to one of their accounts, subject to admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: RequestId,
    pub account_id: AccountId,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub review: ReviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// The fields a user fills in to raise a fund request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundRequest {
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The fields a user fills in to raise a transfer request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransferRequest {
    pub account_id: AccountId,
    pub amount: f64,
    pub description: String,
}

/// A request that goes through the review workflow.
pub trait Reviewable:
    Searchable + Clone + fmt::Debug + Send + Sync + DeserializeOwned + 'static
{
    /// The fields a user submits to create the request.
    type Draft: Serialize + fmt::Debug + Send + Sync;

    const KIND: RequestKind;

    fn id(&self) -> &str;
    fn amount(&self) -> f64;
    fn currency(&self) -> &str;
    fn created_at(&self) -> OffsetDateTime;
    fn requester(&self) -> Option<&UserRef>;
    fn owner_id(&self) -> Option<&str>;
    /// A one line description for tables, e.g. the payment method or destination account.
    fn summary(&self) -> String;
    fn review(&self) -> &ReviewState;
    fn review_mut(&mut self) -> &mut ReviewState;

    /// A freshly submitted request, as the backend would create it.
    fn new_pending(
        id: RequestId,
        owner: &UserRef,
        draft: &Self::Draft,
        created_at: OffsetDateTime,
    ) -> Self;
}

fn review_search_fields<'a>(review: &'a ReviewState, fields: &mut Vec<&'a str>) {
    if let Some(transaction_id) = &review.transaction_id {
        fields.push(transaction_id);
    }
}

fn user_search_fields<'a>(user: Option<&'a UserRef>, fields: &mut Vec<&'a str>) {
    if let Some(user) = user {
        fields.push(&user.name);
        fields.push(&user.email);
    }
}

impl Searchable for FundRequest {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.user_id.as_str(),
            self.payment_method.as_str(),
        ];
        review_search_fields(&self.review, &mut fields);
        user_search_fields(self.user.as_ref(), &mut fields);

        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.review.status.as_query_value())
    }
}

impl Searchable for TransferRequest {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.account_id.as_str(),
            self.description.as_str(),
        ];
        review_search_fields(&self.review, &mut fields);
        user_search_fields(self.user.as_ref(), &mut fields);

        if let Some(account) = &self.account {
            fields.push(&account.holder_name);
            fields.push(&account.account_number);
        }

        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.review.status.as_query_value())
    }
}

impl Reviewable for FundRequest {
    type Draft = NewFundRequest;

    const KIND: RequestKind = RequestKind::Fund;

    fn id(&self) -> &str {
        &self.id
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn requester(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn summary(&self) -> String {
        self.payment_method.clone()
    }

    fn review(&self) -> &ReviewState {
        &self.review
    }

    fn review_mut(&mut self) -> &mut ReviewState {
        &mut self.review
    }

    fn new_pending(
        id: RequestId,
        owner: &UserRef,
        draft: &NewFundRequest,
        created_at: OffsetDateTime,
    ) -> Self {
        let mut review = ReviewState::pending();
        review.notes = draft.notes.clone();

        Self {
            id,
            user_id: owner.id.clone(),
            amount: draft.amount,
            currency: draft.currency.clone(),
            payment_method: draft.payment_method.clone(),
            created_at,
            review,
            user: Some(owner.clone()),
        }
    }
}

impl Reviewable for TransferRequest {
    type Draft = NewTransferRequest;

    const KIND: RequestKind = RequestKind::Transfer;

    fn id(&self) -> &str {
        &self.id
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn currency(&self) -> &str {
        DEFAULT_CURRENCY
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn requester(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    fn owner_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }

    fn summary(&self) -> String {
        match &self.account {
            Some(account) => format!("To {} ({})", account.holder_name, account.account_number),
            None => format!("To account {}", self.account_id),
        }
    }

    fn review(&self) -> &ReviewState {
        &self.review
    }

    fn review_mut(&mut self) -> &mut ReviewState {
        &mut self.review
    }

    fn new_pending(
        id: RequestId,
        owner: &UserRef,
        draft: &NewTransferRequest,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            account_id: draft.account_id.clone(),
            amount: draft.amount,
            description: draft.description.clone(),
            created_at,
            review: ReviewState::pending(),
            account: None,
            user: Some(owner.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        listing::ListFilter,
        request::{RequestKind, RequestStatus},
    };

    use super::{FundRequest, TransferRequest};

    #[test]
    fn deserializes_fund_request_with_review_fields() {
        let json = r#"{
            "id": "fr-1",
            "userId": "u-1",
            "amount": 5000,
            "currency": "INR",
            "paymentMethod": "UPI",
            "status": "PROCESSING",
            "transactionId": "UTR123",
            "createdAt": "2025-04-01T09:30:00Z",
            "updatedAt": "2025-04-01T10:00:00Z",
            "user": {"id": "u-1", "name": "Asha Rao", "email": "asha@example.com"}
        }"#;

        let got: FundRequest = serde_json::from_str(json).unwrap();

        assert_eq!(got.review.status, RequestStatus::Processing);
        assert_eq!(got.review.transaction_id.as_deref(), Some("UTR123"));
        assert!(got.review.updated_at.is_some());
    }

    #[test]
    fn fund_request_defaults_currency() {
        let json = r#"{
            "id": "fr-2",
            "userId": "u-1",
            "amount": 10,
            "status": "PENDING",
            "createdAt": "2025-04-01T09:30:00Z"
        }"#;

        let got: FundRequest = serde_json::from_str(json).unwrap();

        assert_eq!(got.currency, "INR");
    }

    #[test]
    fn deserializes_transfer_request_with_account() {
        let json = r#"{
            "id": "tr-1",
            "accountId": "acc-1",
            "amount": 1200.75,
            "description": "Rent",
            "status": "REJECTED",
            "rejectionReason": "Duplicate request",
            "createdAt": "2025-04-01T09:30:00Z",
            "account": {"id": "acc-1", "holderName": "Asha Rao", "accountNumber": "123456789012"}
        }"#;

        let got: TransferRequest = serde_json::from_str(json).unwrap();

        assert_eq!(got.review.status, RequestStatus::Rejected);
        assert_eq!(got.account.unwrap().holder_name, "Asha Rao");
    }

    #[test]
    fn search_matches_transaction_id() {
        let json = r#"{
            "id": "fr-1", "userId": "u-1", "amount": 1, "status": "PROCESSING",
            "transactionId": "UTR987", "createdAt": "2025-04-01T09:30:00Z"
        }"#;
        let request: FundRequest = serde_json::from_str(json).unwrap();

        assert!(ListFilter::new("utr9", "processing").matches(&request));
    }

    #[test]
    fn kind_paths() {
        assert_eq!(RequestKind::Fund.api_path(), "/fund-requests");
        assert_eq!(RequestKind::Transfer.api_path(), "/transfer-requests");
        assert_eq!(RequestKind::Transfer.to_string(), "transfer");
    }
}
