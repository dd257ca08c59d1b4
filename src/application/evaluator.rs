use crate::domain::event::{PaymentConfirmation, PaymentRequest, Status, TransactionStatus};

/// Computes the transaction status for a matched request/confirmation pair.
///
/// Exact, case-sensitive OTP equality yields `Success`; anything else is
/// `Failure`. No normalization, no trimming. Pure and total: repeated calls
/// with the same inputs produce identical output.
///
/// The engine guarantees both events carry the same transaction ID (that is
/// the join key); a mismatch is a programming-contract violation and is
/// asserted in debug builds only.
pub fn evaluate(
    request: &PaymentRequest,
    confirmation: &PaymentConfirmation,
) -> TransactionStatus {
    debug_assert_eq!(
        request.transaction_id, confirmation.transaction_id,
        "evaluator invoked with mismatched transaction IDs"
    );

    let status = if request.otp == confirmation.otp {
        Status::Success
    } else {
        Status::Failure
    };

    TransactionStatus {
        transaction_id: request.transaction_id.clone(),
        status,
    }
}
