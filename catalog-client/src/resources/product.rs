use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;
use crate::resource::Resource;
use crate::resource::ResourceClient;

/// Product as stored upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Fields a product update may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Resource for ProductRecord {
    const PATH: &'static str = "products_info";
    const ID_FIELD: &'static str = "productId";
    type Patch = ProductPatch;

    fn id(&self) -> &str {
        &self.product_id
    }
}

/// Product as the dashboard edits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
    pub productid: String,
    pub title: String,
    pub short_desc: String,
    pub long_desc: String,
    /// Image keys or URLs; only the first is stored upstream
    pub images: Vec<String>,
    pub order_id: Option<i64>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            productid: record.product_id,
            title: record.title.unwrap_or_default(),
            short_desc: record.short_description.unwrap_or_default(),
            long_desc: record.description.unwrap_or_default(),
            images: record
                .image_url
                .filter(|url| !url.is_empty())
                .into_iter()
                .collect(),
            order_id: None,
        }
    }
}

impl Product {
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            product_id: self.productid.clone(),
            title: Some(self.title.clone()),
            short_description: Some(self.short_desc.clone()),
            description: Some(self.long_desc.clone()),
            image_url: Some(self.images.first().cloned().unwrap_or_default()),
            created_at: None,
            updated_at: None,
        }
    }

    /// Every editable field, for a full-form save.
    pub fn to_patch(&self) -> ProductPatch {
        let record = self.to_record();
        ProductPatch {
            title: record.title,
            short_description: record.short_description,
            description: record.description,
            image_url: record.image_url,
        }
    }
}

/// Product operations expressed in terms of [`Product`].
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    records: ResourceClient<ProductRecord>,
}

impl ProductCatalog {
    pub fn new(records: ResourceClient<ProductRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &ResourceClient<ProductRecord> {
        &self.records
    }

    pub async fn list(&self) -> Result<Vec<Product>, ClientError> {
        Ok(self
            .records
            .list()
            .await?
            .into_iter()
            .map(Product::from)
            .collect())
    }

    pub async fn get(&self, productid: &str) -> Result<Product, ClientError> {
        self.records.get(productid).await.map(Product::from)
    }

    pub async fn create(&self, product: &Product) -> Result<Product, ClientError> {
        if product.productid.trim().is_empty() {
            return Err(ClientError::Validation(
                "Product id must not be empty".to_string(),
            ));
        }

        self.records
            .create(&product.to_record())
            .await
            .map(Product::from)
    }

    pub async fn update(&self, productid: &str, product: &Product) -> Result<Product, ClientError> {
        self.records
            .update(productid, &product.to_patch())
            .await
            .map(Product::from)
    }

    pub async fn remove(&self, productid: &str) -> Result<(), ClientError> {
        self.records.remove(productid).await
    }
}
