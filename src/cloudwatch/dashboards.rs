use std::io::{BufRead, Write};
use std::path::Path;

use futures::{stream, StreamExt, TryStreamExt};
use tracing::info;

use super::alarms::require_name;
use super::Session;
use crate::aws::CloudWatchApi;
use crate::core::{Dashboard, RestoreOutcome};
use crate::error::{FomoError, Result};
use crate::helpers::{replace_object_string, snapshot};
use crate::prompt::Console;

impl<B: CloudWatchApi> Session<B> {
    pub async fn get_dashboard(&self, name: &str) -> Result<Dashboard> {
        self.backend
            .get_dashboard(name)
            .await?
            .ok_or_else(|| FomoError::DashboardNotFound(name.to_string()))
    }

    /// Lists every dashboard and fetches the bodies one at a time.
    pub async fn get_all_dashboards(&self) -> Result<Vec<Dashboard>> {
        let names = self.backend.list_dashboards().await?;
        stream::iter(names.iter())
            .then(|name| self.get_dashboard(name))
            .try_collect()
            .await
    }

    pub async fn put_dashboard(&self, dashboard: &Dashboard, overwrite: bool) -> Result<()> {
        let name = &dashboard.dashboard_name;
        if !overwrite && self.backend.get_dashboard(name).await?.is_some() {
            return Err(FomoError::AlreadyExists {
                kind: "Dashboard",
                name: name.clone(),
            });
        }

        self.backend.put_dashboard(dashboard).await?;
        info!("Dashboard '{name}' written");
        Ok(())
    }

    pub async fn rename_dashboard(
        &self,
        old_name: &str,
        new_name: &str,
        keep_old: bool,
    ) -> Result<()> {
        require_name("new_name", new_name)?;

        let mut dashboard = self.get_dashboard(old_name).await?;
        dashboard.dashboard_name = new_name.to_string();
        dashboard.dashboard_arn = None;
        self.put_dashboard(&dashboard, false).await?;

        if !keep_old {
            self.delete_dashboard(old_name, true).await?;
        }
        info!("Dashboard '{old_name}' renamed to '{new_name}'");
        Ok(())
    }

    pub async fn delete_dashboard(&self, name: &str, confirm: bool) -> Result<()> {
        if !confirm {
            return Err(FomoError::ConfirmationRequired {
                kind: "Dashboard",
                name: name.to_string(),
            });
        }

        self.get_dashboard(name).await?;
        self.backend.delete_dashboards(&[name.to_string()]).await?;
        info!("Dashboard '{name}' deleted");
        Ok(())
    }

    pub async fn replace_active_dashboard_body_string(
        &self,
        name: &str,
        search: &str,
        replace: &str,
        apply: bool,
    ) -> Result<Dashboard> {
        let dashboard = self.get_dashboard(name).await?;
        let replaced = replace_object_string(&dashboard, search, replace)?;

        if apply {
            self.put_dashboard(&replaced, true).await?;
        }
        Ok(replaced)
    }

    pub async fn backup_dashboard(&self, name: &str, path: &Path, overwrite: bool) -> Result<()> {
        let dashboard = self.get_dashboard(name).await?;
        snapshot::write_snapshot(&dashboard, path, overwrite)
    }

    pub async fn backup_all_dashboards(&self, path: &Path, overwrite: bool) -> Result<()> {
        snapshot::ensure_writable(path, overwrite)?;
        let dashboards = self.get_all_dashboards().await?;
        snapshot::write_snapshot(&dashboards, path, overwrite)
    }

    pub async fn restore_dashboard<R: BufRead, W: Write>(
        &self,
        path: &Path,
        name: &str,
        confirm: bool,
        console: &mut Console<R, W>,
    ) -> Result<RestoreOutcome> {
        let dashboards = snapshot::load_dashboards(path)?;
        let Some(dashboard) = dashboards.into_iter().find(|d| d.dashboard_name == name) else {
            console.say(format!("Dashboard '{name}' not found in {}", path.display()))?;
            return Ok(RestoreOutcome::NotFound);
        };

        if !confirm
            && !console.confirm(&format!("Restore Dashboard '{name}' from {}?", path.display()))?
        {
            console.say("Dashboard not restored.")?;
            return Ok(RestoreOutcome::Declined);
        }

        self.put_dashboard(&dashboard, true).await?;
        console.say(format!("Dashboard '{name}' restored."))?;
        Ok(RestoreOutcome::Restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudwatch::fake::{console, session, FakeCloudWatch};

    const BODY: &str = r#"{"widgets":[{"type":"metric","properties":{"region":"us-east-1","metrics":[["AWS/EC2","CPUUtilization","InstanceId","i-0abc"]]}}]}"#;

    fn seeded() -> Session<FakeCloudWatch> {
        let fake = FakeCloudWatch::default();
        fake.insert_dashboard("checkout", BODY);
        fake.insert_dashboard("search", "{\"widgets\":[]}");
        session(fake)
    }

    #[tokio::test]
    async fn bodies_are_fetched_one_at_a_time() {
        let fake = FakeCloudWatch::default();
        for i in 0..50 {
            fake.insert_dashboard(&format!("service-{i:02}"), "{\"widgets\":[]}");
        }
        let s = session(fake);

        let dashboards = s.get_all_dashboards().await.unwrap();
        assert_eq!(dashboards.len(), 50);
        assert_eq!(dashboards[0].dashboard_name, "service-00");
        assert_eq!(s.backend().peak_dashboard_reads(), 1);
    }

    #[tokio::test]
    async fn missing_dashboard_is_not_found() {
        let s = seeded();
        assert!(matches!(
            s.get_dashboard("nope").await,
            Err(FomoError::DashboardNotFound(n)) if n == "nope"
        ));
        assert_eq!(s.get_all_dashboards().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn put_guard_and_rename() {
        let s = seeded();
        let existing = s.get_dashboard("search").await.unwrap();
        assert!(matches!(
            s.put_dashboard(&existing, false).await,
            Err(FomoError::AlreadyExists { kind: "Dashboard", .. })
        ));

        s.rename_dashboard("search", "search-v2", false).await.unwrap();
        assert!(s.get_dashboard("search").await.is_err());
        assert_eq!(
            s.get_dashboard("search-v2").await.unwrap().dashboard_body,
            "{\"widgets\":[]}"
        );

        assert!(s.rename_dashboard("checkout", "", true).await.is_err());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let s = seeded();
        assert!(matches!(
            s.delete_dashboard("checkout", false).await,
            Err(FomoError::ConfirmationRequired { .. })
        ));
        s.delete_dashboard("checkout", true).await.unwrap();
        assert!(s.get_dashboard("checkout").await.is_err());
    }

    #[tokio::test]
    async fn body_replacement_reaches_inside_the_body() {
        let s = seeded();
        let replaced = s
            .replace_active_dashboard_body_string("checkout", "i-0abc", "i-0def", true)
            .await
            .unwrap();
        assert!(replaced.dashboard_body.contains("i-0def"));
        assert!(s
            .get_dashboard("checkout")
            .await
            .unwrap()
            .dashboard_body
            .contains("i-0def"));
    }

    #[tokio::test]
    async fn backup_then_restore() {
        let s = seeded();
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("checkout.json");
        let all = dir.path().join("dashboards.json");

        s.backup_dashboard("checkout", &one, false).await.unwrap();
        assert!(matches!(
            s.backup_dashboard("nope", &one, true).await,
            Err(FomoError::DashboardNotFound(_))
        ));
        s.backup_all_dashboards(&all, false).await.unwrap();

        s.delete_dashboard("checkout", true).await.unwrap();
        let mut c = console("");
        assert_eq!(
            s.restore_dashboard(&one, "checkout", true, &mut c).await.unwrap(),
            RestoreOutcome::Restored
        );
        assert_eq!(s.get_dashboard("checkout").await.unwrap().dashboard_body, BODY);

        let mut c = console("n\n");
        assert_eq!(
            s.restore_dashboard(&all, "search", false, &mut c).await.unwrap(),
            RestoreOutcome::Declined
        );
        assert_eq!(
            s.restore_dashboard(&all, "ghost", true, &mut c).await.unwrap(),
            RestoreOutcome::NotFound
        );
    }
}
