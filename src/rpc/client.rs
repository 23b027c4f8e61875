use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::membership::{Member, Status};
use crate::rpc::Data;

pub struct Client {
    socket_address: SocketAddr,
}

impl Client {
    pub async fn init(socket_address: SocketAddr) -> Result<Client, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Client { socket_address })
    }

    pub async fn leave(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let leave_request = Data::LeaveRequest.build().await?;
        let response = self.transmit(&leave_request).await?;
        let flexbuffers_root = flexbuffers::Reader::get_root(response.as_slice())?;

        match flexbuffers_root.as_map().idx("data").as_str() {
            "leave_response" => {
                let details = flexbuffers_root.as_map().idx("details").as_map();

                match details.idx("ok").as_bool() {
                    true => Ok(()),
                    false => Err(Box::from("agent failed to leave the cluster!")),
                }
            }
            _ => Err(Box::from("unexpected response for leave request!")),
        }
    }

    pub async fn members(&self) -> Result<Vec<Member>, Box<dyn std::error::Error + Send + Sync>> {
        let members_request = Data::MembersRequest.build().await?;
        let response = self.transmit(&members_request).await?;
        let flexbuffers_root = flexbuffers::Reader::get_root(response.as_slice())?;

        match flexbuffers_root.as_map().idx("data").as_str() {
            "members_response" => {
                let details = flexbuffers_root.as_map().idx("details").as_map();
                let members_vector = details.idx("members").as_vector();
                let mut members = Vec::with_capacity(members_vector.len());

                for member_entry in members_vector.iter() {
                    let member_map = member_entry.as_map();

                    members.push(Member {
                        address: IpAddr::from_str(member_map.idx("address").as_str())?,
                        name: member_map.idx("name").as_str().to_string(),
                        status: Status::from_str(member_map.idx("status").as_str()).await?,
                    });
                }

                Ok(members)
            }
            _ => Err(Box::from("unexpected response for members request!")),
        }
    }

    pub async fn transmit(&self, data: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tcp_stream = TcpStream::connect(self.socket_address).await?;

        tcp_stream.write_all(data).await?;
        tcp_stream.shutdown().await?;

        let mut response = Vec::with_capacity(1024);

        tcp_stream.read_to_end(&mut response).await?;

        Ok(response)
    }
}
