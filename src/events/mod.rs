use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::LOW_STOCK_THRESHOLD;

/// Cloneable handle the services use to queue events for the processor.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The events the system can emit. Ids are store-assigned item ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated {
        item_id: String,
        barcode: String,
    },
    ItemRestocked {
        item_id: String,
        barcode: String,
        added: i32,
        quantity: i32,
    },
    ItemUpdated {
        item_id: String,
        barcode: String,
    },
    StockDecremented {
        item_id: String,
        barcode: String,
        remaining: i32,
    },
    LookupServed {
        barcode: String,
        found: bool,
    },
}

/// Drains the event channel and turns each event into structured log output.
/// Runs until every sender handle is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!("Received event: {:?}", event);

        match event {
            Event::ItemCreated { item_id, barcode } => {
                info!(%item_id, %barcode, "item created");
            }
            Event::ItemRestocked {
                item_id,
                barcode,
                added,
                quantity,
            } => {
                info!(%item_id, %barcode, added, quantity, "item restocked");
            }
            Event::ItemUpdated { item_id, barcode } => {
                info!(%item_id, %barcode, "item updated");
            }
            Event::StockDecremented {
                item_id,
                barcode,
                remaining,
            } => {
                if remaining == 0 {
                    warn!(%item_id, %barcode, "stock depleted");
                } else if remaining < LOW_STOCK_THRESHOLD {
                    warn!(%item_id, %barcode, remaining, "stock running low");
                } else {
                    info!(%item_id, %barcode, remaining, "stock decremented");
                }
            }
            Event::LookupServed { barcode, found } => {
                debug!(%barcode, found, "barcode lookup served");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn processor_drains_the_channel_and_stops_when_senders_drop() {
        let (tx, rx) = mpsc::channel(8);
        let processor = tokio::spawn(process_events(rx));

        let sender = EventSender::new(tx);
        sender
            .send(Event::ItemCreated {
                item_id: "a".to_string(),
                barcode: "111".to_string(),
            })
            .await
            .unwrap();
        sender
            .send(Event::StockDecremented {
                item_id: "a".to_string(),
                barcode: "111".to_string(),
                remaining: 0,
            })
            .await
            .unwrap();

        drop(sender);
        processor.await.unwrap();
    }

    #[tokio::test]
    async fn send_reports_a_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        let err = sender
            .send(Event::LookupServed {
                barcode: "111".to_string(),
                found: false,
            })
            .await
            .unwrap_err();
        assert!(err.contains("Failed to send event"));
    }
}
