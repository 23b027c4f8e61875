use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal::ctrl_c;

use crate::channel::hosts::HostsRequest;
use crate::channel::membership::{Event, MembershipRequest};
use crate::channel::shutdown::Shutdown;
use crate::hosts;
use crate::membership::{Events, Member, Membership};
use crate::node::Node;
use crate::rpc;
use crate::server::Server;
use crate::{error, info};

pub async fn launch(
    node: Node,
    launch_members: Vec<Member>,
    hosts_path: PathBuf,
    hosts_interval: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("node id -> {:?}", &node.id);
    info!("host table -> {:?}", &hosts_path);

    // -------------------------------------------------------------------------------------------
    // |        init shutdown channel
    // -------------------------------------------------------------------------------------------

    let shutdown_signal = Shutdown::build().await;
    let shutdown_synchronizer_task = shutdown_signal.subscribe();
    let shutdown_events_task = shutdown_signal.subscribe();
    let shutdown_rpc_server_task = shutdown_signal.subscribe();
    let mut shutdown_watcher_task = shutdown_signal.subscribe();

    // -------------------------------------------------------------------------------------------
    // |        init membership and hosts channels
    // -------------------------------------------------------------------------------------------

    let (membership_sender, membership_receiver) = MembershipRequest::build().await;
    let synchronizer_membership_sender = membership_sender.to_owned();

    let (hosts_sender, hosts_receiver) = HostsRequest::build().await;
    let synchronizer_hosts_sender = hosts_sender.to_owned();

    let event_sender = Event::build().await;
    let events_receiver = event_sender.subscribe();

    // -------------------------------------------------------------------------------------------
    // |        load the host table
    // -------------------------------------------------------------------------------------------

    let mut manager = hosts::Manager::init(hosts_path, hosts_receiver).await?;

    let manager_handle = tokio::spawn(async move {
        if let Err(error) = manager.run().await {
            error!("host table manager -> {:?}", error);
        }
    });

    // -------------------------------------------------------------------------------------------
    // |        start the timer driven synchronizer
    // -------------------------------------------------------------------------------------------

    let mut synchronizer = hosts::Synchronizer::init(
        synchronizer_membership_sender,
        synchronizer_hosts_sender,
        hosts_interval,
        shutdown_synchronizer_task,
    )
    .await?;

    let synchronizer_handle = tokio::spawn(async move {
        if let Err(error) = synchronizer.run().await {
            error!("host table synchronizer -> {:?}", error);
        }
    });

    // -------------------------------------------------------------------------------------------
    // |        join membership and drain its events
    // -------------------------------------------------------------------------------------------

    let mut membership = match Membership::init(
        node.to_owned(),
        launch_members,
        membership_receiver,
        event_sender,
    )
    .await
    {
        Ok(membership) => membership,
        Err(error) => {
            error!("membership -> {:?}", error);

            Shutdown::send(&shutdown_signal).await?;

            return Err(error);
        }
    };

    let membership_handle = tokio::spawn(async move {
        if let Err(error) = membership.run().await {
            error!("membership -> {:?}", error);
        }
    });

    let mut events = Events::init(events_receiver, shutdown_events_task).await?;

    let events_handle = tokio::spawn(async move {
        if let Err(error) = events.run().await {
            error!("membership events -> {:?}", error);
        }
    });

    // -------------------------------------------------------------------------------------------
    // |        bind the control plane interface
    // -------------------------------------------------------------------------------------------

    let server = Arc::new(Server::init(membership_sender, shutdown_signal.to_owned()).await?);
    let rpc_socket_address = node.build_rpc_address().await;

    let mut rpc_server = match rpc::Server::init(
        server.to_owned(),
        rpc_socket_address,
        shutdown_rpc_server_task,
    )
    .await
    {
        Ok(rpc_server) => rpc_server,
        Err(error) => {
            error!("control plane interface -> {:?}", error);

            if let Err(shutdown_error) = server.shutdown().await {
                error!("shutdown -> {:?}", shutdown_error);
            }

            return Err(error);
        }
    };

    let rpc_server_handle = tokio::spawn(async move {
        if let Err(error) = rpc_server.run().await {
            error!("control plane interface -> {:?}", error);
        }
    });

    // -------------------------------------------------------------------------------------------
    // |        init shutdown signal watcher
    // -------------------------------------------------------------------------------------------

    let watcher_server = server.to_owned();

    let shutdown_watcher_handle = tokio::spawn(async move {
        tokio::select! {
            interrupt = ctrl_c() => {
                info!("received interrupt {:?}", interrupt);

                if let Err(error) = watcher_server.shutdown().await {
                    error!("shutdown -> {:?}", error);
                }
            }
            _ = shutdown_watcher_task.recv() => {
                info!("shutting down...");
            }
        }
    });

    // -------------------------------------------------------------------------------------------
    // |        launch!!!
    // -------------------------------------------------------------------------------------------

    drop(hosts_sender);
    drop(server);

    tokio::try_join!(
        manager_handle,
        synchronizer_handle,
        membership_handle,
        events_handle,
        rpc_server_handle,
        shutdown_watcher_handle,
    )?;

    Ok(())
}
