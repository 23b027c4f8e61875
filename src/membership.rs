use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;

use tokio::sync::broadcast::error::RecvError;

use crate::channel::membership::{Event, EventReceiver, EventSender};
use crate::channel::membership::{MembershipReceiver, MembershipRequest, MembershipResponse};
use crate::channel::shutdown::ShutdownReceiver;
use crate::node::Node;
use crate::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Alive,
    Leaving,
    Left,
    Failed,
}

impl Status {
    pub async fn from_str(status: &str) -> Result<Status, Box<dyn std::error::Error + Send + Sync>> {
        match status {
            "alive" => Ok(Status::Alive),
            "leaving" => Ok(Status::Leaving),
            "left" => Ok(Status::Left),
            "failed" => Ok(Status::Failed),
            _ => Err(Box::from(format!("unknown member status -> {}", status))),
        }
    }

    pub async fn as_str(&self) -> &str {
        match self {
            Status::Alive => "alive",
            Status::Leaving => "leaving",
            Status::Left => "left",
            Status::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub address: IpAddr,
    pub name: String,
    pub status: Status,
}

impl Member {
    pub async fn from_str(member: &str) -> Result<Member, Box<dyn std::error::Error + Send + Sync>> {
        match member.split_once('@') {
            Some((name, address)) if !name.is_empty() => {
                let address = IpAddr::from_str(address)?;

                Ok(Member {
                    address,
                    name: name.to_string(),
                    status: Status::Alive,
                })
            }
            _ => Err(Box::from(format!(
                "expected <name>@<address> for member -> {}",
                member,
            ))),
        }
    }
}

pub struct Membership {
    node: Node,
    members: HashMap<IpAddr, Member>,
    receiver: MembershipReceiver,
    event: EventSender,
}

impl Membership {
    pub async fn init(
        node: Node,
        launch_members: Vec<Member>,
        receiver: MembershipReceiver,
        event: EventSender,
    ) -> Result<Membership, Box<dyn std::error::Error + Send + Sync>> {
        let mut members = HashMap::with_capacity(10);

        let local_member = Member {
            address: node.address,
            name: node.name.to_owned(),
            status: Status::Alive,
        };

        members.insert(local_member.address, local_member.to_owned());

        Self::emit(&event, Event::Joined(local_member)).await;

        for launch_member in launch_members {
            members.insert(launch_member.address, launch_member.to_owned());

            Self::emit(&event, Event::Joined(launch_member)).await;
        }

        info!("initialized!");

        Ok(Membership {
            node,
            members,
            receiver,
            event,
        })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("running...");

        while let Some((request, response)) = self.receiver.recv().await {
            match request {
                MembershipRequest::Members => {
                    let mut members = Vec::with_capacity(self.members.len());

                    for member in self.members.values() {
                        members.push(member.to_owned());
                    }

                    response.send(MembershipResponse::Members(members))?;
                }
                MembershipRequest::Leave => {
                    info!("leaving cluster...");

                    let leaving = self.leave().await?;

                    Self::emit(&self.event, Event::Left(leaving)).await;

                    response.send(MembershipResponse::Left)?;
                }
                MembershipRequest::Shutdown => {
                    info!("shutting down...");

                    self.receiver.close();
                }
            }
        }

        Ok(())
    }

    async fn leave(&mut self) -> Result<Member, Box<dyn std::error::Error + Send + Sync>> {
        match self.members.get_mut(&self.node.address) {
            Some(local_member) => {
                local_member.status = Status::Leaving;

                Ok(local_member.to_owned())
            }
            None => Err(Box::from("local member is not in the membership list!")),
        }
    }

    async fn emit(event: &EventSender, member_event: Event) {
        if event.send(member_event).is_err() {
            debug!("no active membership event subscribers...");
        }
    }
}

pub struct Events {
    events: EventReceiver,
    shutdown: ShutdownReceiver,
}

impl Events {
    pub async fn init(
        events: EventReceiver,
        shutdown: ShutdownReceiver,
    ) -> Result<Events, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Events { events, shutdown })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("running...");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    info!("shutting down membership events...");

                    break
                }
                event = self.events.recv() => match event {
                    Ok(Event::Joined(member)) => info!("member joined -> {:?}", member),
                    Ok(Event::Updated(member)) => info!("member updated -> {:?}", member),
                    Ok(Event::Left(member)) => info!("member left -> {:?}", member),
                    Ok(Event::Failed(member)) => error!("member failed -> {:?}", member),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("membership events lagged -> {:?}", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }

        Ok(())
    }
}
