use async_trait::async_trait;
use log::*;
use postgrest::{Builder, Postgrest};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{config::Config, GenericError};

use super::DistributionCenter;

pub type Record = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Supabase answered {status} on `{table}`: {body}")]
    Status {
        table: &'static str,
        status: u16,
        body: String,
    },
}

#[async_trait]
pub trait StoreService: Send + Sync {
    fn new(config: &Config) -> Result<Self, GenericError>
    where
        Self: Sized;
    async fn list_products(&self) -> Result<Vec<Record>, GenericError>;
    async fn get_product(&self, id: &str) -> Result<Option<Record>, GenericError>;
    async fn list_distribution_centers(&self) -> Result<Vec<DistributionCenter>, GenericError>;
}

pub struct SupabaseService {
    client: Postgrest,
    supabase_key: String,
}

impl SupabaseService {
    fn table(&self, table: &str) -> Builder {
        self.client.from(table).auth(&self.supabase_key)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: Builder,
    ) -> Result<Vec<T>, GenericError> {
        let response = query.execute().await?;
        let status = response.status();
        let raw_resp = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                table,
                status: status.as_u16(),
                body: raw_resp,
            }
            .into());
        }

        let rows: Vec<T> = serde_json::from_str(&raw_resp)?;
        trace!("Fetched {} rows from `{}`.", rows.len(), table);
        Ok(rows)
    }
}

#[async_trait]
impl StoreService for SupabaseService {
    fn new(config: &Config) -> Result<Self, GenericError> {
        let supabase_key = config.supabase_key.clone();
        let client =
            Postgrest::new(config.rest_endpoint()).insert_header("apikey", &supabase_key);
        Ok(SupabaseService {
            client,
            supabase_key,
        })
    }

    async fn list_products(&self) -> Result<Vec<Record>, GenericError> {
        self.fetch("products", self.table("products").select("*"))
            .await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Record>, GenericError> {
        debug!("Looking up product {}.", id);
        let query = self.table("products").select("*").eq("id", id).limit(1);
        let mut rows: Vec<Record> = self.fetch("products", query).await?;
        Ok(rows.pop())
    }

    async fn list_distribution_centers(&self) -> Result<Vec<DistributionCenter>, GenericError> {
        let query = self.table("distribution_centers").select("*").order("id.asc");
        self.fetch("distribution_centers", query).await
    }
}

/// Store backed by in-process vectors, used by the HTTP tests.
#[cfg(test)]
pub mod memory {
    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub products: Vec<Record>,
        pub centers: Vec<DistributionCenter>,
        pub fail_with: Option<String>,
    }

    impl MemoryStore {
        fn check(&self) -> Result<(), GenericError> {
            match &self.fail_with {
                Some(msg) => Err(msg.clone().into()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl StoreService for MemoryStore {
        fn new(_: &Config) -> Result<Self, GenericError> {
            Ok(MemoryStore::default())
        }

        async fn list_products(&self) -> Result<Vec<Record>, GenericError> {
            self.check()?;
            Ok(self.products.clone())
        }

        async fn get_product(&self, id: &str) -> Result<Option<Record>, GenericError> {
            self.check()?;
            Ok(self
                .products
                .iter()
                .find(|p| match p.get("id") {
                    Some(Value::String(s)) => s == id,
                    Some(other) => other.to_string() == id,
                    None => false,
                })
                .cloned())
        }

        async fn list_distribution_centers(&self) -> Result<Vec<DistributionCenter>, GenericError> {
            self.check()?;
            Ok(self.centers.clone())
        }
    }
}
