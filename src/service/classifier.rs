use crate::gateways::WebhookParse;

pub const MIN_REAL_TRANSACTION_ID_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedEvent {
    Payment {
        transaction_id: String,
        provider_status: Option<String>,
    },
    Probe,
    Malformed,
}

pub fn classify(parse: &WebhookParse) -> ClassifiedEvent {
    match parse {
        WebhookParse::Unrecognized => ClassifiedEvent::Malformed,
        WebhookParse::Event {
            transaction_id: None,
            ..
        } => ClassifiedEvent::Probe,
        WebhookParse::Event {
            transaction_id: Some(id),
            provider_status,
        } => {
            if is_sandbox_sentinel(id) {
                ClassifiedEvent::Probe
            } else {
                ClassifiedEvent::Payment {
                    transaction_id: id.clone(),
                    provider_status: provider_status.clone(),
                }
            }
        }
    }
}

pub fn is_sandbox_sentinel(transaction_id: &str) -> bool {
    let id = transaction_id.trim();
    if id.is_empty() {
        return true;
    }

    id.len() < MIN_REAL_TRANSACTION_ID_LEN && id.chars().all(|c| c.is_ascii_digit())
}
