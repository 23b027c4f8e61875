use flexbuffers::{Builder, BuilderOptions};

use crate::membership::Member;

pub use client::Client;
pub use server::Server;

mod client;
mod server;

pub enum Data {
    LeaveRequest,
    LeaveResponse(bool),
    MembersRequest,
    MembersResponse(Vec<Member>),
}

impl Data {
    pub async fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let flexbuffer_options = BuilderOptions::SHARE_NONE;
        let mut flexbuffers_builder = Builder::new(flexbuffer_options);
        let mut flexbuffers_data = flexbuffers_builder.start_map();

        match self {
            Data::LeaveRequest => {
                flexbuffers_data.push("data", "leave_request");
                flexbuffers_data.end_map();

                Ok(flexbuffers_builder.take_buffer())
            }
            Data::LeaveResponse(ok) => {
                flexbuffers_data.push("data", "leave_response");

                let mut details = flexbuffers_data.start_map("details");

                details.push("ok", *ok);
                details.end_map();

                flexbuffers_data.end_map();

                Ok(flexbuffers_builder.take_buffer())
            }
            Data::MembersRequest => {
                flexbuffers_data.push("data", "members_request");
                flexbuffers_data.end_map();

                Ok(flexbuffers_builder.take_buffer())
            }
            Data::MembersResponse(members) => {
                flexbuffers_data.push("data", "members_response");

                let mut details = flexbuffers_data.start_map("details");
                let mut members_vector = details.start_vector("members");

                for member in members {
                    let mut member_map = members_vector.start_map();

                    member_map.push("address", member.address.to_string().as_str());
                    member_map.push("name", member.name.as_str());
                    member_map.push("status", member.status.as_str().await);
                    member_map.end_map();
                }

                members_vector.end_vector();
                details.end_map();

                flexbuffers_data.end_map();

                Ok(flexbuffers_builder.take_buffer())
            }
        }
    }
}
