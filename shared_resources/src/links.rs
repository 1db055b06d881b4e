//! Point-to-point message links between the nodes.
//!
//! Every node sees one [`LinkSender`] per peer it may talk to and one inbound
//! receiver per peer that talks to it. The links are either plain crossbeam
//! channels (all nodes in one process) or bridged over UDP with `network-rust`.

use std::collections::HashMap;
use std::fmt;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error};
use network_rust::udpnet::link;

use crate::config::NetworkConfig;
use crate::error::LinkError;
use crate::message::Message;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Scheduler,
    Elevator,
    Floor,
    Gui,
}

impl Subsystem {
    /// The nodes that exchange messages over real links. `Gui` only ever
    /// receives, from the scheduler.
    pub const NODES: [Subsystem; 3] = [Subsystem::Scheduler, Subsystem::Elevator, Subsystem::Floor];
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subsystem::Scheduler => "scheduler",
            Subsystem::Elevator => "elevator",
            Subsystem::Floor => "floor",
            Subsystem::Gui => "gui",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone)]
pub struct LinkSender {
    from: Subsystem,
    to: Subsystem,
    tx: Sender<Message>,
}

impl LinkSender {
    pub fn new(from: Subsystem, to: Subsystem, tx: Sender<Message>) -> Self {
        LinkSender { from, to, tx }
    }

    pub fn to(&self) -> Subsystem {
        self.to
    }

    /// Refuses messages that have no business on this link.
    pub fn send(&self, message: Message) -> Result<(), LinkError> {
        let kind = message.kind();
        if !kind.is_routable(self.from, self.to) {
            return Err(LinkError::Unroutable {
                kind,
                from: self.from,
                to: self.to,
            });
        }
        self.tx.send(message).map_err(|_| LinkError::Closed {
            from: self.from,
            to: self.to,
        })
    }
}

pub struct NodeLinks {
    node: Subsystem,
    outbound: HashMap<Subsystem, LinkSender>,
    inbound: HashMap<Subsystem, Receiver<Message>>,
}

impl NodeLinks {
    pub fn new(node: Subsystem) -> Self {
        NodeLinks {
            node,
            outbound: HashMap::new(),
            inbound: HashMap::new(),
        }
    }

    pub fn node(&self) -> Subsystem {
        self.node
    }

    pub fn add_outbound(&mut self, to: Subsystem, tx: Sender<Message>) {
        self.outbound.insert(to, LinkSender::new(self.node, to, tx));
    }

    pub fn add_inbound(&mut self, from: Subsystem, rx: Receiver<Message>) {
        self.inbound.insert(from, rx);
    }

    pub fn sender_to(&self, to: Subsystem) -> Result<LinkSender, LinkError> {
        self.outbound
            .get(&to)
            .cloned()
            .ok_or(LinkError::Missing(self.node, to))
    }

    pub fn take_inbound(&mut self, from: Subsystem) -> Result<Receiver<Message>, LinkError> {
        self.inbound
            .remove(&from)
            .ok_or(LinkError::Missing(self.node, from))
    }

    /// Bridge every link of `node` over UDP. Receiving sockets are bound
    /// before this returns so a taken port fails startup.
    pub fn udp(node: Subsystem, network: &NetworkConfig) -> Result<Self, LinkError> {
        let mut links = NodeLinks::new(node);

        for peer in Subsystem::NODES.into_iter().filter(|peer| *peer != node) {
            // OUTBOUND: channel -> socket
            let port = network
                .port(node, peer)
                .ok_or(LinkError::Missing(node, peer))?;
            let remote = link::resolve(&network.host, port)?;
            let (tx, rx) = unbounded::<Message>();
            thread::Builder::new()
                .name(format!("{}-to-{}", node, peer))
                .spawn(move || {
                    if let Err(e) = link::tx(remote, rx) {
                        error!("Link {} -> {} failed: {}", node, peer, e);
                    }
                })?;
            links.add_outbound(peer, tx);

            // INBOUND: socket -> channel
            let port = network
                .port(peer, node)
                .ok_or(LinkError::Missing(peer, node))?;
            let socket = link::bind_rx(port)?;
            let (tx, rx) = unbounded::<Message>();
            thread::Builder::new()
                .name(format!("{}-from-{}", node, peer))
                .spawn(move || {
                    if let Err(e) = link::rx_on(socket, tx) {
                        debug!("Link {} -> {} stopped: {}", peer, node, e);
                    }
                })?;
            links.add_inbound(peer, rx);
        }

        Ok(links)
    }
}

/// All links of a single-process run, plus the receiving end of the
/// scheduler's status mirror.
pub struct InProcessNetwork {
    pub scheduler: NodeLinks,
    pub elevator: NodeLinks,
    pub floor: NodeLinks,
    pub gui: Receiver<Message>,
}

pub fn in_process() -> InProcessNetwork {
    let mut scheduler = NodeLinks::new(Subsystem::Scheduler);
    let mut elevator = NodeLinks::new(Subsystem::Elevator);
    let mut floor = NodeLinks::new(Subsystem::Floor);

    for from in Subsystem::NODES {
        for to in Subsystem::NODES.into_iter().filter(|to| *to != from) {
            let (tx, rx) = unbounded::<Message>();
            match from {
                Subsystem::Scheduler => scheduler.add_outbound(to, tx),
                Subsystem::Elevator => elevator.add_outbound(to, tx),
                _ => floor.add_outbound(to, tx),
            }
            match to {
                Subsystem::Scheduler => scheduler.add_inbound(from, rx),
                Subsystem::Elevator => elevator.add_inbound(from, rx),
                _ => floor.add_inbound(from, rx),
            }
        }
    }

    let (gui_tx, gui) = unbounded::<Message>();
    scheduler.add_outbound(Subsystem::Gui, gui_tx);

    InProcessNetwork {
        scheduler,
        elevator,
        floor,
        gui,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::message::FloorRequest;

    #[test]
    fn in_process_links_connect_every_node_pair() {
        let mut net = in_process();
        let to_scheduler = net.floor.sender_to(Subsystem::Scheduler).expect("floor -> scheduler");
        let from_floor = net.scheduler.take_inbound(Subsystem::Floor).expect("scheduler <- floor");

        let request = Message::FloorRequest(FloorRequest::new(3, Direction::Down));
        to_scheduler.send(request.clone()).expect("send");
        assert_eq!(from_floor.try_recv().expect("delivered"), request);

        assert!(net.elevator.sender_to(Subsystem::Floor).is_ok());
        assert!(net.floor.sender_to(Subsystem::Gui).is_err());
        assert!(net.scheduler.sender_to(Subsystem::Gui).is_ok());
    }

    #[test]
    fn unroutable_messages_are_refused() {
        let net = in_process();
        let to_elevator = net.floor.sender_to(Subsystem::Elevator).expect("floor -> elevator");
        let err = to_elevator
            .send(Message::FloorRequest(FloorRequest::new(1, Direction::Up)))
            .expect_err("floor requests go to the scheduler");
        assert!(matches!(err, LinkError::Unroutable { .. }));
    }

    #[test]
    fn inbound_receiver_can_only_be_taken_once() {
        let mut net = in_process();
        assert!(net.elevator.take_inbound(Subsystem::Scheduler).is_ok());
        assert!(matches!(
            net.elevator.take_inbound(Subsystem::Scheduler),
            Err(LinkError::Missing(Subsystem::Elevator, Subsystem::Scheduler))
        ));
    }

    #[test]
    fn closed_link_is_reported() {
        let mut net = in_process();
        let to_floor = net.scheduler.sender_to(Subsystem::Floor).expect("scheduler -> floor");
        drop(net.floor.take_inbound(Subsystem::Scheduler));
        let err = to_floor
            .send(Message::turn_off_floor_lamp(2, Direction::Up))
            .expect_err("receiver dropped");
        assert!(matches!(err, LinkError::Closed { .. }));
    }
}
