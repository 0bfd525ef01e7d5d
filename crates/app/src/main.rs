use hookline_auth::{GroupStore, User};
use hookline_infra::HooklineConfig;

fn main() -> anyhow::Result<()> {
    hookline_observability::init();

    let config = HooklineConfig::from_env()?;
    let app = hookline_app::build_app(&config)?;

    let mut user = User::new("demo", "demo@example.com")?;
    let outcome = app.users.save(&user)?;
    let groups = app.groups.groups_of(user.id)?;
    tracing::info!(user_id = %user.id, ?outcome, ?groups, "user saved");

    user.change_email("demo+updated@example.com")?;
    let outcome = app.users.save(&user)?;
    let groups = app.groups.groups_of(user.id)?;
    tracing::info!(user_id = %user.id, ?outcome, ?groups, "user saved");

    app.users.delete(user.id)?;
    let groups = app.groups.groups_of(user.id)?;
    tracing::info!(user_id = %user.id, ?groups, "user deleted");

    app.shutdown()?;
    Ok(())
}
