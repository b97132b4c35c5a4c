use super::types::*;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::models::credentials::Credentials;

impl ApiClient {
    /// Sign in, persist the credential pair and load the profile.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let request = ApiRequest::post("/auth/login/").json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let tokens: TokenPair = self.fetch(&request).await?;
        self.session().set(&Credentials::from(tokens))?;
        tracing::info!(email, "Signed in");

        self.profile().await
    }

    pub async fn register(&self, form: &RegisterRequest) -> ApiResult<User> {
        form.validate()?;

        let request = ApiRequest::post("/auth/register/").json(form)?;
        let response: RegisterResponse = self.fetch(&request).await?;
        self.session().set(&Credentials::from(response.tokens))?;
        tracing::info!(user_id = response.user.id, "Registered new account");

        Ok(response.user)
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.session().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Load the profile for a stored session. Any failure drops the session
    /// and yields `None`.
    pub async fn restore_session(&self) -> ApiResult<Option<User>> {
        if !self.session().is_signed_in()? {
            return Ok(None);
        }

        match self.profile().await {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::info!(error = %err, "Stored session is no longer usable");
                self.session().clear()?;
                Ok(None)
            }
        }
    }

    pub async fn profile(&self) -> ApiResult<User> {
        self.fetch(&ApiRequest::get("/auth/profile/")).await
    }

    pub async fn update_profile(&self, changes: &ProfileUpdate) -> ApiResult<User> {
        changes.validate()?;
        self.fetch(&ApiRequest::patch("/auth/profile/update/").json(changes)?)
            .await
    }

    pub async fn change_password(&self, form: &PasswordChange) -> ApiResult<()> {
        form.validate()?;
        self.call(&ApiRequest::post("/auth/profile/password/").json(form)?)
            .await?;
        tracing::info!("Password changed");
        Ok(())
    }

    pub async fn profile_stats(&self) -> ApiResult<ProfileStats> {
        self.fetch(&ApiRequest::get("/auth/profile/stats/")).await
    }

    pub async fn public_profile(&self, user_id: u64) -> ApiResult<User> {
        self.fetch(&ApiRequest::get(format!("/auth/users/{user_id}/")))
            .await
    }
}
