use std::net::{IpAddr, SocketAddr};

use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Node {
    pub id: Uuid,
    pub name: String,
    pub address: IpAddr,
    pub rpc_port: u16,
}

impl Node {
    pub async fn init(
        name: String,
        address: IpAddr,
        rpc_port: u16,
    ) -> Result<Node, Box<dyn std::error::Error + Send + Sync>> {
        let id = Uuid::new_v4();

        Ok(Node {
            id,
            name,
            address,
            rpc_port,
        })
    }

    pub async fn build_rpc_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.rpc_port)
    }
}
