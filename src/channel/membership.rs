use std::fmt;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::membership::Member;

pub type MembershipReceiver =
    mpsc::Receiver<(MembershipRequest, oneshot::Sender<MembershipResponse>)>;
pub type MembershipSender = mpsc::Sender<(MembershipRequest, oneshot::Sender<MembershipResponse>)>;

pub type EventReceiver = broadcast::Receiver<Event>;
pub type EventSender = broadcast::Sender<Event>;

#[derive(Clone, Debug)]
pub enum MembershipRequest {
    Members,
    Leave,
    Shutdown,
}

impl MembershipRequest {
    pub async fn build() -> (MembershipSender, MembershipReceiver) {
        let (membership_sender, membership_receiver) =
            mpsc::channel::<(MembershipRequest, oneshot::Sender<MembershipResponse>)>(64);

        (membership_sender, membership_receiver)
    }

    pub async fn cluster_members(
        membership: &MembershipSender,
    ) -> Result<Vec<Member>, Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        membership
            .send((MembershipRequest::Members, request))
            .await?;

        match response.await? {
            MembershipResponse::Members(cluster_members) => Ok(cluster_members),
            _ => Err(Box::from(
                "unexpected response for membership members request!",
            )),
        }
    }

    pub async fn leave(membership: &MembershipSender) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        membership.send((MembershipRequest::Leave, request)).await?;

        match response.await? {
            MembershipResponse::Left => Ok(()),
            _ => Err(Box::from(
                "unexpected response for membership leave request!",
            )),
        }
    }

    pub async fn shutdown(membership: &MembershipSender) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (_request, _response) = oneshot::channel();

        membership
            .send((MembershipRequest::Shutdown, _request))
            .await?;

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum MembershipResponse {
    Members(Vec<Member>),
    Left,
}

impl fmt::Display for MembershipResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let membership_response = "Membership Response |";

        match self {
            MembershipResponse::Members(members) => {
                write!(f, "{} members -> {:?}", membership_response, members)
            }
            MembershipResponse::Left => write!(f, "{} left", membership_response),
        }
    }
}

impl std::error::Error for MembershipResponse {}

#[derive(Clone, Debug)]
pub enum Event {
    Joined(Member),
    Updated(Member),
    Left(Member),
    Failed(Member),
}

impl Event {
    pub async fn build() -> EventSender {
        let (event_sender, _event_receiver) = broadcast::channel::<Event>(64);

        event_sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Status;
    use std::net::IpAddr;
    use std::str::FromStr;

    #[tokio::test(flavor = "multi_thread")]
    async fn build() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (test_membership_sender, _test_membership_receiver) = MembershipRequest::build().await;

        assert_eq!(test_membership_sender.capacity(), 64);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cluster_members() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (test_membership_sender, mut test_membership_receiver) =
            MembershipRequest::build().await;

        tokio::spawn(async move {
            if let Some((MembershipRequest::Members, response)) =
                test_membership_receiver.recv().await
            {
                let test_member = Member {
                    address: IpAddr::from_str("10.0.0.1").unwrap(),
                    name: String::from("test_member"),
                    status: Status::Alive,
                };

                response
                    .send(MembershipResponse::Members(vec![test_member]))
                    .unwrap();
            }
        });

        let test_members = MembershipRequest::cluster_members(&test_membership_sender).await?;

        assert_eq!(test_members.len(), 1);
        assert_eq!(test_members[0].name.as_str(), "test_member");

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn leave() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (test_membership_sender, mut test_membership_receiver) =
            MembershipRequest::build().await;

        tokio::spawn(async move {
            if let Some((MembershipRequest::Leave, response)) =
                test_membership_receiver.recv().await
            {
                response.send(MembershipResponse::Left).unwrap();
            }
        });

        MembershipRequest::leave(&test_membership_sender).await?;

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn event_build() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_event_sender = Event::build().await;

        assert_eq!(test_event_sender.receiver_count(), 0);

        Ok(())
    }
}
