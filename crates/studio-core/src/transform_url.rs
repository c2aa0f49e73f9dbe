//! Delivery URL building for stored and derived images

use crate::models::Transformation;

/// Builds delivery URLs of the form
/// `{delivery_base}/{cloud_name}/image/upload[/{transformation}]/{public_id}`.
#[derive(Debug, Clone)]
pub struct TransformUrlBuilder {
    delivery_base_url: String,
    cloud_name: String,
}

impl TransformUrlBuilder {
    pub fn new(delivery_base_url: impl Into<String>, cloud_name: impl Into<String>) -> Self {
        Self {
            delivery_base_url: delivery_base_url.into().trim_end_matches('/').to_string(),
            cloud_name: cloud_name.into(),
        }
    }

    fn upload_root(&self) -> String {
        format!("{}/{}/image/upload", self.delivery_base_url, self.cloud_name)
    }

    /// URL of the untouched asset
    pub fn secure_url(&self, public_id: &str) -> String {
        format!("{}/{}", self.upload_root(), encode_public_id(public_id))
    }

    /// URL of the derived asset. An empty transformation yields the secure URL.
    pub fn build(&self, public_id: &str, transformation: &Transformation) -> String {
        match transformation.to_url_segment() {
            Some(segment) => format!(
                "{}/{}/{}",
                self.upload_root(),
                segment,
                encode_public_id(public_id)
            ),
            None => self.secure_url(public_id),
        }
    }
}

/// Percent-encode each folder segment of a public ID, keeping the separators.
fn encode_public_id(public_id: &str) -> String {
    public_id
        .trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
