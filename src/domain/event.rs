/// A provider event after signature verification and decoding.
///
/// Adding a new recognized kind is a compile-time decision: reconciliation
/// matches exhaustively on this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// The intent settled successfully on the provider side.
    IntentSucceeded { intent_id: String },
    /// The payment attempt failed.
    IntentFailed { intent_id: String },
    /// A captured charge was refunded; correlated through the charge's
    /// associated intent id.
    ChargeRefunded {
        charge_id: String,
        intent_id: String,
    },
    /// An event kind this system does not handle. Absorbed with a log line.
    Unrecognized { kind: String },
}
