pub mod tripay_client;
