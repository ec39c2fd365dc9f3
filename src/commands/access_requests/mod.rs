pub mod approve_access_request_command;
pub mod reject_access_request_command;
pub mod submit_access_request_command;

pub use approve_access_request_command::ApproveAccessRequestCommand;
pub use reject_access_request_command::RejectAccessRequestCommand;
pub use submit_access_request_command::SubmitAccessRequestCommand;
