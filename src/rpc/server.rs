use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::channel::shutdown::ShutdownReceiver;
use crate::rpc::Data;
use crate::server;
use crate::{error, info};

pub struct Server {
    socket_address: SocketAddr,
    tcp_listener: TcpListener,
    server: Arc<server::Server>,
    shutdown: ShutdownReceiver,
}

impl Server {
    pub async fn init(
        server: Arc<server::Server>,
        socket_address: SocketAddr,
        shutdown: ShutdownReceiver,
    ) -> Result<Server, Box<dyn std::error::Error + Send + Sync>> {
        let tcp_socket = match socket_address {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };

        tcp_socket.set_reuseaddr(true)?;
        tcp_socket.bind(socket_address)?;

        let backlog = 1024;
        let tcp_listener = tcp_socket.listen(backlog)?;

        info!("control plane listening on {:?}", &socket_address);

        Ok(Server {
            socket_address,
            tcp_listener,
            server,
            shutdown,
        })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("running on {:?}...", &self.socket_address);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    info!("shutting down control plane interface...");

                    break
                }
                accepted = self.tcp_listener.accept() => match accepted {
                    Ok((tcp_stream, socket_address)) => {
                        info!("accepted connection -> {:?}", &socket_address);

                        let server = self.server.to_owned();

                        tokio::spawn(async move {
                            if let Err(error) = Self::handle_connection(tcp_stream, server).await {
                                error!("control plane connection -> {:?}", error);
                            }
                        });
                    }
                    Err(error) => error!("control plane accept -> {:?}", error),
                }
            }
        }

        Ok(())
    }

    async fn handle_connection(
        mut tcp_stream: TcpStream,
        server: Arc<server::Server>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut request = Vec::with_capacity(1024);

        tcp_stream.read_to_end(&mut request).await?;

        let response = Self::route_incoming(&request, &server).await?;

        tcp_stream.write_all(&response).await?;
        tcp_stream.shutdown().await?;

        Ok(())
    }

    async fn route_incoming(
        data: &[u8],
        server: &Arc<server::Server>,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let flexbuffers_root = flexbuffers::Reader::get_root(data)?;

        match flexbuffers_root.as_map().idx("data").as_str() {
            "leave_request" => {
                info!("received leave request!");

                let ok = match server.shutdown().await {
                    Ok(()) => true,
                    Err(error) => {
                        error!("leave -> {:?}", error);

                        false
                    }
                };

                let leave_response = Data::LeaveResponse(ok).build().await?;

                Ok(leave_response)
            }
            "members_request" => {
                info!("received members request!");

                let members = server.members().await?;
                let members_response = Data::MembersResponse(members).build().await?;

                Ok(members_response)
            }
            _ => {
                info!("received unknown request...");

                Ok(String::from("unknown").as_bytes().to_vec())
            }
        }
    }
}
