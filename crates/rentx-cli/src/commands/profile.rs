use rentx_core::util::normalize_text_option;
use rentx_core::{ProfileEdit, User};

use crate::cli::ProfileCommands;
use crate::commands::common::{format_user_lines, Session};
use crate::error::CliError;

pub async fn run_profile(session: &Session, command: ProfileCommands) -> Result<(), CliError> {
    match command {
        ProfileCommands::Show { json } => run_profile_show(session, json).await,
        ProfileCommands::Edit {
            id,
            name,
            driver_license,
            avatar,
        } => {
            let edit = ProfileEdit {
                name,
                driver_license,
                avatar,
            };
            let user = run_profile_edit(session, &id, &edit).await?;
            println!("{}", user.id);
            Ok(())
        }
    }
}

async fn run_profile_show(session: &Session, as_json: bool) -> Result<(), CliError> {
    let users = session.store.collection::<User>().query().fetch().await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        for line in format_user_lines(&users) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Apply the edit locally and queue it; works offline
pub async fn run_profile_edit(
    session: &Session,
    id: &str,
    edit: &ProfileEdit,
) -> Result<User, CliError> {
    let edit = ProfileEdit {
        name: normalize_text_option(edit.name.clone()),
        driver_license: normalize_text_option(edit.driver_license.clone()),
        avatar: normalize_text_option(edit.avatar.clone()),
    };
    if edit.is_empty() {
        return Err(CliError::EmptyProfileEdit);
    }

    Ok(session.store.update_profile(id, &edit).await?)
}
