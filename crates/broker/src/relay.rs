use std::collections::HashSet;

use tandem::BusFrame;

/// One frame fanned out to every subscribed connection, pre-encoded so the
/// relay serializes once per publish rather than once per receiver.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub topic: String,
    pub line: String,
}

/// What a connection's inbound line asks the relay to do.
#[derive(Debug)]
pub enum Inbound {
    Subscribed(usize),
    Relay(Relayed),
    Dropped,
}

/// Interpret one line from a peer, updating that connection's subscription
/// set. Malformed lines are dropped, never fatal to the connection.
pub fn process_line(topics: &mut HashSet<String>, line: &str) -> Inbound {
    let frame = match BusFrame::decode_line(line) {
        Ok(frame) => frame,
        Err(err) => {
            log::warn!("dropping malformed frame: {err}");
            return Inbound::Dropped;
        }
    };

    match frame {
        BusFrame::Subscribe { topics: requested } => {
            topics.extend(requested);
            Inbound::Subscribed(topics.len())
        }
        BusFrame::Publish { topic, payload } => {
            let frame = BusFrame::publish(topic.clone(), payload);
            match frame.encode_line() {
                Ok(line) => Inbound::Relay(Relayed { topic, line }),
                Err(err) => {
                    log::warn!("dropping unencodable frame on {topic}: {err}");
                    Inbound::Dropped
                }
            }
        }
    }
}

/// Delivery rule: a frame reaches every subscribed connection, including
/// the one that published it. Self-delivery is what lets a detecting peer
/// apply its own collision consequences.
pub fn should_deliver(topics: &HashSet<String>, relayed: &Relayed) -> bool {
    topics.contains(&relayed.topic)
}
