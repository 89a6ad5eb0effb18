pub(crate) mod branches;
pub(crate) mod checkout;
pub(crate) mod clone;
pub(crate) mod fetch;
pub(crate) mod info;
pub(crate) mod init;
pub(crate) mod push;
pub(crate) mod status;
