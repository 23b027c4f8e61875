use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::channel::hosts::{HostsReceiver, HostsRequest, HostsResponse, HostsSender};
use crate::channel::membership::{MembershipRequest, MembershipSender};
use crate::channel::shutdown::ShutdownReceiver;
use crate::{error, info, warn};

use table::Table;

pub mod table;

pub struct Manager {
    table: Table,
    path: PathBuf,
    receiver: HostsReceiver,
}

impl Manager {
    pub async fn init(
        path: PathBuf,
        receiver: HostsReceiver,
    ) -> Result<Manager, Box<dyn std::error::Error + Send + Sync>> {
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Table::from_contents(&contents).await,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                warn!("writing a new host table at -> {:?}", &path);

                Table::init().await
            }
            Err(error) => return Err(Box::new(error)),
        };

        info!("initialized!");

        Ok(Manager {
            table,
            path,
            receiver,
        })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("running...");

        while let Some((request, response)) = self.receiver.recv().await {
            match request {
                HostsRequest::Entries => {
                    let entries = self.table.entries().await;

                    response.send(HostsResponse::Entries(entries))?;
                }
                HostsRequest::Update(members) => {
                    self.table.reconcile(&members).await;

                    response.send(self.persist().await)?;
                }
                HostsRequest::Insert(entry) => {
                    self.table.upsert(entry.address, entry.name).await;

                    response.send(self.persist().await)?;
                }
                HostsRequest::Remove(address) => {
                    self.table.remove(&address).await;

                    response.send(self.persist().await)?;
                }
                HostsRequest::Shutdown => {
                    info!("shutting down...");

                    self.receiver.close();
                }
            }
        }

        Ok(())
    }

    async fn persist(&self) -> HostsResponse {
        match self.rewrite().await {
            Ok(()) => HostsResponse::Ok,
            Err(error) => {
                // in-memory entries already moved ahead of the backing file
                error!(
                    "host table diverged from {:?} -> {:?}",
                    &self.path, error,
                );

                HostsResponse::Error(error.to_string())
            }
        }
    }

    async fn rewrite(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let contents = self.table.to_contents().await;

        let suffix = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>();

        let mut swap_path = self.path.to_owned().into_os_string();

        swap_path.push(format!(".{}", suffix));

        let swap_path = PathBuf::from(swap_path);

        tokio::fs::write(&swap_path, contents.as_bytes()).await?;
        tokio::fs::rename(&swap_path, &self.path).await?;

        Ok(())
    }
}

pub struct Synchronizer {
    membership: MembershipSender,
    hosts: HostsSender,
    interval: Duration,
    shutdown: ShutdownReceiver,
}

impl Synchronizer {
    pub async fn init(
        membership: MembershipSender,
        hosts: HostsSender,
        interval: Duration,
        shutdown: ShutdownReceiver,
    ) -> Result<Synchronizer, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Synchronizer {
            membership,
            hosts,
            interval,
            shutdown,
        })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut interval = tokio::time::interval(self.interval);

        info!("running...");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    info!("shutting down host table synchronizer...");

                    break
                }
                _ = interval.tick() => {
                    match MembershipRequest::cluster_members(&self.membership).await {
                        Ok(members) => {
                            if let Err(error) = HostsRequest::update(&self.hosts, members).await {
                                error!("host table update -> {:?}", error);
                            }
                        }
                        Err(error) => error!("cluster members -> {:?}", error),
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::membership::MembershipResponse;
    use crate::channel::shutdown::Shutdown;
    use crate::membership::{Member, Status};
    use std::collections::HashSet;
    use std::net::IpAddr;
    use std::str::FromStr;

    #[tokio::test(flavor = "multi_thread")]
    async fn init_missing_file() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");
        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;

        let mut test_manager = Manager::init(test_path, test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        let test_entries = HostsRequest::entries(&test_hosts_sender).await?;

        assert!(test_entries.is_empty());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_existing_file() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");

        tokio::fs::write(
            &test_path,
            "10.0.0.1 some_name\n10.0.0.2 alias other_name\nmalformed\n",
        )
        .await?;

        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;
        let mut test_manager = Manager::init(test_path, test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        let test_entries = HostsRequest::entries(&test_hosts_sender)
            .await?
            .into_iter()
            .map(|test_entry| (test_entry.address.to_string(), test_entry.name))
            .collect::<HashSet<_>>();

        assert_eq!(test_entries.len(), 2);
        assert!(test_entries.contains(&(String::from("10.0.0.1"), String::from("some_name"))));
        assert!(test_entries.contains(&(String::from("10.0.0.2"), String::from("other_name"))));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_reconciles_and_persists() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");

        tokio::fs::write(&test_path, "10.0.0.2 old\n10.0.0.3 c\n").await?;

        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;
        let mut test_manager = Manager::init(test_path.to_owned(), test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        let test_members = vec![
            Member {
                address: IpAddr::from_str("10.0.0.1")?,
                name: String::from("a"),
                status: Status::Alive,
            },
            Member {
                address: IpAddr::from_str("10.0.0.2")?,
                name: String::from("b"),
                status: Status::Alive,
            },
            Member {
                address: IpAddr::from_str("10.0.0.3")?,
                name: String::from("c"),
                status: Status::Failed,
            },
        ];

        HostsRequest::update(&test_hosts_sender, test_members.to_vec()).await?;

        let test_entries = HostsRequest::entries(&test_hosts_sender)
            .await?
            .into_iter()
            .map(|test_entry| (test_entry.address.to_string(), test_entry.name))
            .collect::<HashSet<_>>();

        assert_eq!(test_entries.len(), 2);
        assert!(test_entries.contains(&(String::from("10.0.0.1"), String::from("a"))));
        assert!(test_entries.contains(&(String::from("10.0.0.2"), String::from("b"))));

        let test_contents = tokio::fs::read_to_string(&test_path).await?;

        assert_eq!(test_contents.lines().count(), 2);

        let test_persisted = Table::from_contents(&test_contents)
            .await
            .entries()
            .await
            .into_iter()
            .map(|test_entry| (test_entry.address.to_string(), test_entry.name))
            .collect::<HashSet<_>>();

        assert_eq!(test_persisted, test_entries);

        // reapplying the same snapshot leaves the table unchanged
        HostsRequest::update(&test_hosts_sender, test_members).await?;

        let test_repeat_entries = HostsRequest::entries(&test_hosts_sender)
            .await?
            .into_iter()
            .map(|test_entry| (test_entry.address.to_string(), test_entry.name))
            .collect::<HashSet<_>>();

        assert_eq!(test_repeat_entries, test_entries);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn insert_and_remove_persist() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");
        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;

        let mut test_manager = Manager::init(test_path.to_owned(), test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        let test_address = IpAddr::from_str("10.0.0.1")?;

        HostsRequest::insert(&test_hosts_sender, test_address, String::from("some_name")).await?;

        let test_contents = tokio::fs::read_to_string(&test_path).await?;

        assert_eq!(test_contents.as_str(), "10.0.0.1 some_name\n");

        HostsRequest::remove(&test_hosts_sender, test_address).await?;

        let test_contents = tokio::fs::read_to_string(&test_path).await?;

        assert!(test_contents.is_empty());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_mutations() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");
        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;

        let mut test_manager = Manager::init(test_path.to_owned(), test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        let mut test_handles = Vec::with_capacity(20);

        for test_octet in 1..=20u8 {
            let test_mutation_sender = test_hosts_sender.to_owned();

            test_handles.push(tokio::spawn(async move {
                let test_address =
                    IpAddr::from_str(&format!("10.0.0.{}", test_octet)).unwrap();

                HostsRequest::insert(
                    &test_mutation_sender,
                    test_address,
                    format!("node_{}", test_octet),
                )
                .await
                .unwrap();

                if test_octet % 5 == 0 {
                    HostsRequest::remove(&test_mutation_sender, test_address)
                        .await
                        .unwrap();
                }
            }));
        }

        for test_handle in test_handles {
            assert!(test_handle.await.is_ok());
        }

        let test_entries = HostsRequest::entries(&test_hosts_sender)
            .await?
            .into_iter()
            .collect::<HashSet<_>>();

        assert_eq!(test_entries.len(), 16);

        let test_contents = tokio::fs::read_to_string(&test_path).await?;
        let test_persisted = Table::from_contents(&test_contents)
            .await
            .entries()
            .await
            .into_iter()
            .collect::<HashSet<_>>();

        assert_eq!(test_persisted, test_entries);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn synchronizer() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let test_directory = tempfile::tempdir()?;
        let test_path = test_directory.path().join("hosts");
        let (test_hosts_sender, test_hosts_receiver) = HostsRequest::build().await;
        let (test_membership_sender, mut test_membership_receiver) =
            MembershipRequest::build().await;
        let test_shutdown_sender = Shutdown::build().await;

        let mut test_manager = Manager::init(test_path.to_owned(), test_hosts_receiver).await?;

        tokio::spawn(async move {
            if let Err(error) = test_manager.run().await {
                panic!("hosts manager run error -> {:?}", error);
            }
        });

        tokio::spawn(async move {
            while let Some((request, response)) = test_membership_receiver.recv().await {
                if let MembershipRequest::Members = request {
                    let test_member = Member {
                        address: IpAddr::from_str("10.0.0.1").unwrap(),
                        name: String::from("a"),
                        status: Status::Alive,
                    };

                    response
                        .send(MembershipResponse::Members(vec![test_member]))
                        .unwrap();
                }
            }
        });

        let mut test_synchronizer = Synchronizer::init(
            test_membership_sender,
            test_hosts_sender.to_owned(),
            Duration::from_millis(100),
            test_shutdown_sender.subscribe(),
        )
        .await?;

        let test_synchronizer_handle = tokio::spawn(async move {
            if let Err(error) = test_synchronizer.run().await {
                panic!("synchronizer run error -> {:?}", error);
            }
        });

        tokio::time::sleep(Duration::from_millis(250)).await;

        Shutdown::send(&test_shutdown_sender).await?;

        assert!(test_synchronizer_handle.await.is_ok());

        let test_entries = HostsRequest::entries(&test_hosts_sender).await?;

        assert_eq!(test_entries.len(), 1);
        assert_eq!(test_entries[0].name.as_str(), "a");

        let test_contents = tokio::fs::read_to_string(&test_path).await?;

        assert_eq!(test_contents.as_str(), "10.0.0.1 a\n");

        Ok(())
    }
}
