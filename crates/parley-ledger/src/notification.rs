use parley_types::models::TransactionStatus;

/// Map a gateway notification onto a transaction status.
///
/// Matching is case-insensitive. Returns `None` for a `transaction_status`
/// the gateway is not known to send.
pub fn status_from_notification(
    transaction_status: &str,
    fraud_status: &str,
) -> Option<TransactionStatus> {
    let status = transaction_status.to_ascii_lowercase();
    match status.as_str() {
        "capture" if fraud_status.eq_ignore_ascii_case("accept") => Some(TransactionStatus::Success),
        "capture" => Some(TransactionStatus::Fraud),
        "settlement" => Some(TransactionStatus::Success),
        "deny" | "cancel" | "expire" => Some(TransactionStatus::Failed),
        "pending" => Some(TransactionStatus::PendingPayment),
        _ => None,
    }
}
