/// Point-to-point UDP links between subsystems. Every datagram carries one
/// JSON encoded value; there is no framing, acknowledgement or retry.
pub mod link;

mod sock;
