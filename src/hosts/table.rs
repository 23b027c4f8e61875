use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;

use crate::membership::{Member, Status};
use crate::warn;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostEntry {
    pub address: IpAddr,
    pub name: String,
}

pub struct Table {
    entries: HashMap<IpAddr, String>,
}

impl Table {
    pub async fn init() -> Table {
        let entries = HashMap::with_capacity(10);

        Table { entries }
    }

    pub async fn from_contents(contents: &str) -> Table {
        let mut entries = HashMap::with_capacity(10);

        for line in contents.lines() {
            let fields = line.split_whitespace().collect::<Vec<&str>>();

            if fields.len() < 2 {
                continue;
            }

            let address = match IpAddr::from_str(fields[0]) {
                Ok(address) => address,
                Err(error) => {
                    warn!("skipping host entry {} -> {:?}", fields[0], error);

                    continue;
                }
            };

            // legacy alias form <address> <alias> <name> resolves to the third field
            let name = if fields.len() >= 3 { fields[2] } else { fields[1] };

            entries.insert(address, name.to_string());
        }

        Table { entries }
    }

    pub async fn to_contents(&self) -> String {
        let mut contents = String::with_capacity(self.entries.len() * 32);

        for (address, name) in &self.entries {
            contents.push_str(&address.to_string());
            contents.push(' ');
            contents.push_str(name);
            contents.push('\n');
        }

        contents
    }

    pub async fn reconcile(&mut self, members: &[Member]) {
        let mut entries = HashMap::with_capacity(members.len());

        for member in members {
            if member.status == Status::Alive {
                entries.insert(member.address, member.name.to_owned());
            }
        }

        self.entries = entries;
    }

    pub async fn upsert(&mut self, address: IpAddr, name: String) {
        self.entries.insert(address, name);
    }

    pub async fn remove(&mut self, address: &IpAddr) {
        self.entries.remove(address);
    }

    pub async fn get(&self, address: &IpAddr) -> Option<&String> {
        self.entries.get(address)
    }

    pub async fn len(&self) -> usize {
        self.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn entries(&self) -> Vec<HostEntry> {
        let mut entries = Vec::with_capacity(self.entries.len());

        for (address, name) in &self.entries {
            entries.push(HostEntry {
                address: address.to_owned(),
                name: name.to_owned(),
            });
        }

        entries
    }
}
