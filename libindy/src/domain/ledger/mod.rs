pub mod attrib;
pub mod constants;
pub mod cred_def;
pub mod nym;
pub mod request;
pub mod response;
pub mod rev_reg_def;
pub mod schema;
pub mod txn;
