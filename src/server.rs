use std::sync::atomic::{AtomicBool, Ordering};

use crate::channel::membership::{MembershipRequest, MembershipSender};
use crate::channel::shutdown::{Shutdown, ShutdownSender};
use crate::membership::Member;
use crate::{error, info};

pub struct Server {
    membership: MembershipSender,
    shutdown: ShutdownSender,
    guard: AtomicBool,
}

impl Server {
    pub async fn init(
        membership: MembershipSender,
        shutdown: ShutdownSender,
    ) -> Result<Server, Box<dyn std::error::Error + Send + Sync>> {
        let guard = AtomicBool::new(false);

        info!("initialized!");

        Ok(Server {
            membership,
            shutdown,
            guard,
        })
    }

    pub async fn members(&self) -> Result<Vec<Member>, Box<dyn std::error::Error + Send + Sync>> {
        MembershipRequest::cluster_members(&self.membership).await
    }

    pub async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.guard.swap(true, Ordering::SeqCst) {
            info!("shutdown already in progress...");

            return Ok(());
        }

        info!("leaving cluster and shutting down...");

        let leave_result = MembershipRequest::leave(&self.membership).await;

        if let Err(error) = &leave_result {
            error!("membership leave -> {:?}", error);
        }

        if let Err(error) = MembershipRequest::shutdown(&self.membership).await {
            error!("membership shutdown -> {:?}", error);
        }

        if let Err(error) = Shutdown::send(&self.shutdown).await {
            error!("shutdown signal -> {:?}", error);
        }

        leave_result
    }
}
