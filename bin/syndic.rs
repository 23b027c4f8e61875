use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Arg, Command};

use syndic::membership::Member;
use syndic::node::Node;
use syndic::rpc::Client;
use syndic::runtime;

fn rpc_address_arg() -> Arg<'static> {
    Arg::new("rpc-address")
        .long("rpc-address")
        .takes_value(true)
        .default_value("127.0.0.1:8300")
        .help("control plane address of the running agent")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let syndic = Command::new("syndic")
        .about("membership aware cluster agent")
        .subcommand_required(true)
        .subcommand(
            Command::new("agent")
                .about("run the cluster agent")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .takes_value(true)
                        .required(true)
                        .help("node name published to the host table"),
                )
                .arg(
                    Arg::new("address")
                        .long("address")
                        .takes_value(true)
                        .default_value("127.0.0.1")
                        .help("advertised node address"),
                )
                .arg(
                    Arg::new("rpc-port")
                        .long("rpc-port")
                        .takes_value(true)
                        .default_value("8300")
                        .help("control plane listen port"),
                )
                .arg(
                    Arg::new("hosts-file")
                        .long("hosts-file")
                        .takes_value(true)
                        .default_value("/etc/hosts")
                        .help("path of the synchronized host table"),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .takes_value(true)
                        .default_value("30")
                        .help("host table refresh interval in seconds"),
                )
                .arg(
                    Arg::new("peers")
                        .long("peers")
                        .takes_value(true)
                        .use_value_delimiter(true)
                        .help("static launch members as <name>@<address>"),
                ),
        )
        .subcommand(
            Command::new("leave")
                .about("gracefully leave the cluster and shut down the agent")
                .arg(rpc_address_arg()),
        )
        .subcommand(
            Command::new("members")
                .about("list current cluster members")
                .arg(rpc_address_arg()),
        );

    match syndic.get_matches().subcommand() {
        Some(("agent", matches)) => {
            let name = matches.value_of("name").ok_or("a node name is required")?;
            let address = IpAddr::from_str(
                matches
                    .value_of("address")
                    .ok_or("a node address is required")?,
            )?;
            let rpc_port = matches
                .value_of("rpc-port")
                .ok_or("a control plane port is required")?
                .parse::<u16>()?;
            let hosts_path = PathBuf::from(
                matches
                    .value_of("hosts-file")
                    .ok_or("a host table path is required")?,
            );
            let hosts_interval = Duration::from_secs(
                matches
                    .value_of("interval")
                    .ok_or("a refresh interval is required")?
                    .parse::<u64>()?,
            );

            let mut launch_members = Vec::with_capacity(10);

            if let Some(peers) = matches.values_of("peers") {
                for peer in peers {
                    launch_members.push(Member::from_str(peer).await?);
                }
            }

            let node = Node::init(name.to_string(), address, rpc_port).await?;

            runtime::launch(node, launch_members, hosts_path, hosts_interval).await?;
        }
        Some(("leave", matches)) => {
            let rpc_address = SocketAddr::from_str(
                matches
                    .value_of("rpc-address")
                    .ok_or("a control plane address is required")?,
            )?;

            let client = Client::init(rpc_address).await?;

            client.leave().await?;

            println!("agent is leaving the cluster...");
        }
        Some(("members", matches)) => {
            let rpc_address = SocketAddr::from_str(
                matches
                    .value_of("rpc-address")
                    .ok_or("a control plane address is required")?,
            )?;

            let client = Client::init(rpc_address).await?;

            for member in client.members().await? {
                println!(
                    "{} {} {}",
                    member.address,
                    member.name,
                    member.status.as_str().await,
                );
            }
        }
        _ => (),
    }

    Ok(())
}
