use std::fmt;
use std::net::IpAddr;

use tokio::sync::{mpsc, oneshot};

use crate::hosts::table::HostEntry;
use crate::membership::Member;

pub type HostsReceiver = mpsc::Receiver<(HostsRequest, oneshot::Sender<HostsResponse>)>;
pub type HostsSender = mpsc::Sender<(HostsRequest, oneshot::Sender<HostsResponse>)>;

#[derive(Clone, Debug)]
pub enum HostsRequest {
    Entries,
    Update(Vec<Member>),
    Insert(HostEntry),
    Remove(IpAddr),
    Shutdown,
}

impl HostsRequest {
    pub async fn build() -> (HostsSender, HostsReceiver) {
        let (hosts_sender, hosts_receiver) =
            mpsc::channel::<(HostsRequest, oneshot::Sender<HostsResponse>)>(64);

        (hosts_sender, hosts_receiver)
    }

    pub async fn entries(
        hosts: &HostsSender,
    ) -> Result<Vec<HostEntry>, Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        hosts.send((HostsRequest::Entries, request)).await?;

        match response.await? {
            HostsResponse::Entries(entries) => Ok(entries),
            HostsResponse::Error(error) => Err(Box::from(error)),
            _ => Err(Box::from("unexpected response for host entries request!")),
        }
    }

    pub async fn update(
        hosts: &HostsSender,
        members: Vec<Member>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        hosts.send((HostsRequest::Update(members), request)).await?;

        match response.await? {
            HostsResponse::Ok => Ok(()),
            HostsResponse::Error(error) => Err(Box::from(error)),
            _ => Err(Box::from("unexpected response for host update request!")),
        }
    }

    pub async fn insert(
        hosts: &HostsSender,
        address: IpAddr,
        name: String,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        hosts
            .send((HostsRequest::Insert(HostEntry { address, name }), request))
            .await?;

        match response.await? {
            HostsResponse::Ok => Ok(()),
            HostsResponse::Error(error) => Err(Box::from(error)),
            _ => Err(Box::from("unexpected response for host insert request!")),
        }
    }

    pub async fn remove(
        hosts: &HostsSender,
        address: IpAddr,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (request, response) = oneshot::channel();

        hosts.send((HostsRequest::Remove(address), request)).await?;

        match response.await? {
            HostsResponse::Ok => Ok(()),
            HostsResponse::Error(error) => Err(Box::from(error)),
            _ => Err(Box::from("unexpected response for host remove request!")),
        }
    }

    pub async fn shutdown(hosts: &HostsSender) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (_request, _response) = oneshot::channel();

        hosts.send((HostsRequest::Shutdown, _request)).await?;

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum HostsResponse {
    Entries(Vec<HostEntry>),
    Ok,
    Error(String),
}

impl fmt::Display for HostsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hosts_response = "Hosts Response |";

        match self {
            HostsResponse::Entries(entries) => {
                write!(f, "{} entries -> {:?}", hosts_response, entries)
            }
            HostsResponse::Ok => write!(f, "{} ok", hosts_response),
            HostsResponse::Error(error) => write!(f, "{} error -> {}", hosts_response, error),
        }
    }
}

impl std::error::Error for HostsResponse {}
