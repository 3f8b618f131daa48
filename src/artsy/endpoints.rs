// Artsy API endpoint functions.
// Provides typed methods for the token exchange, show lookup, and show listings.

use serde_json::Value;

use crate::error::{EmergenceError, Result};

use super::client::ArtsyClient;
use super::routes::{ArtsyRoute, ShowKind};
use super::token::XAppToken;
use super::types::{Artwork, Location, Show, XAppTokenResponse, decode, decode_list};

impl ArtsyClient {
    /// Exchange the client credentials for a fresh XApp token.
    pub async fn fetch_xapp_token(&self) -> Result<XAppToken> {
        let response = self.send(&self.xapp_route(), None).await?;
        let body: XAppTokenResponse = response.json().await?;
        XAppToken::from_response(body)
    }

    /// Get a single show by id.
    pub async fn get_show(&self, show_id: &str) -> Result<Show> {
        let route = ArtsyRoute::ShowInfo {
            show_id: show_id.to_string(),
        };
        let json: Value = self.request(&route).await?.json().await?;
        decode(&json).ok_or_else(|| EmergenceError::Decode(format!("show {} is incomplete", show_id)))
    }

    /// Get the featured shows.
    pub async fn get_featured_shows(&self) -> Result<Vec<Show>> {
        self.get_show_list(&ArtsyRoute::FeaturedShows).await
    }

    /// Get shows near a location.
    pub async fn get_shows_near(&self, location: &Location, kind: ShowKind) -> Result<Vec<Show>> {
        let route = kind.route(&location.latitude.to_string(), &location.longitude.to_string());
        self.get_show_list(&route).await
    }

    /// Get the published artworks in a show.
    pub async fn get_show_artworks(&self, show: &Show) -> Result<Vec<Artwork>> {
        let partner = show.partner.as_ref().ok_or_else(|| {
            EmergenceError::Other(format!("show {} has no partner", show.id))
        })?;
        let route = ArtsyRoute::ShowArtworks {
            partner_id: partner.id.clone(),
            show_id: show.id.clone(),
        };
        let json: Value = self.request(&route).await?.json().await?;
        decode_list(&json)
    }

    async fn get_show_list(&self, route: &ArtsyRoute) -> Result<Vec<Show>> {
        let json: Value = self.request(route).await?.json().await?;
        decode_list(&json)
    }
}
