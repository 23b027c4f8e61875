use serde::{Deserialize, Serialize};

use crate::node::Node;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Report {
    pub id: String,
    pub address: String,
    pub memory_utilization: String,
}

impl Report {
    pub async fn build(node: &Node, memory_utilization: f64) -> Report {
        Report {
            id: node.id.to_string(),
            address: node.address.to_string(),
            memory_utilization: format!("{:.2}", memory_utilization),
        }
    }

    pub async fn to_bytes(&self) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let bytes = postcard::to_allocvec(self)?;

        Ok(bytes)
    }

    pub async fn from_bytes(bytes: &[u8]) -> Result<Report, Box<dyn std::error::Error + Send + Sync>> {
        let report = postcard::from_bytes(bytes)?;

        Ok(report)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub credentials: Vec<u8>,
    pub hostname: String,
    pub poll_interval_secs: u64,
}

impl Registration {
    pub async fn to_bytes(&self) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let bytes = postcard::to_allocvec(self)?;

        Ok(bytes)
    }

    pub async fn from_bytes(bytes: &[u8]) -> Result<Registration, Box<dyn std::error::Error + Send + Sync>> {
        let registration = postcard::from_bytes(bytes)?;

        Ok(registration)
    }
}
