use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

use resource_tree_wizard::cli::terminal_prompter::TerminalPrompter;
use resource_tree_wizard::domain::activity::activity::Activity;
use resource_tree_wizard::domain::activity::activity_options::{ActivityChildItem, ExecuteActivityOptions};
use resource_tree_wizard::domain::activity::activity_registry::ActivityRegistry;
use resource_tree_wizard::domain::activity::activity_status::ActivityStatus;
use resource_tree_wizard::domain::activity::progress::ProgressUpdate;
use resource_tree_wizard::domain::picker::predicate::NodePredicate;
use resource_tree_wizard::domain::picker::quick_pick::Prompter;
use resource_tree_wizard::domain::picker::resource_pick_chain::{AppResourcePickOptions, pick_app_resource, pick_tree_item};
use resource_tree_wizard::domain::tree::node_kind::APPLICATION_CONTEXT_VALUE;
use resource_tree_wizard::domain::tree::tree_node::TreeNode;
use resource_tree_wizard::domain::utils::id::ActivityId;
use resource_tree_wizard::error::{Error, Result};
use resource_tree_wizard::{load_hierarchy, load_settings, logger};

/// Pick a resource from a hierarchy file and run a tracked activity on it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Hierarchy JSON file.
    #[arg(long, default_value = "data/hierarchy.json")]
    hierarchy: String,

    /// Optional picker settings JSON file.
    #[arg(long)]
    settings: Option<String>,

    /// Context value of the resource to pick.
    #[arg(long, default_value = APPLICATION_CONTEXT_VALUE)]
    tag: String,

    /// Context value of a descendant to pick below the resource.
    #[arg(long)]
    child_tag: Option<String>,

    /// Search the whole hierarchy instead of subscription, group and resource steps.
    #[arg(long)]
    recursive: bool,
}

#[tokio::main]
async fn main() {
    logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        match e {
            ref e if e.is_user_cancelled() => log::info!("Cancelled by the user."),
            Error::NoResourceFound(message) => println!("{} {}", "Nothing to select:".yellow(), message),
            e => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let source = Arc::new(load_hierarchy(&args.hierarchy, settings.page_size)?);
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter::stdio());
    let predicate = NodePredicate::tag(args.tag.clone());

    let picked = if args.recursive {
        pick_tree_item(source, prompter, predicate, settings.skip_if_one).await?
    } else {
        let mut options = AppResourcePickOptions::new(predicate).with_skip_if_one(settings.skip_if_one).with_hide_step_count(settings.hide_step_count);
        if let Some(child_tag) = &args.child_tag {
            options = options.with_child_predicate(NodePredicate::tag(child_tag.clone()));
        }
        pick_app_resource(source, prompter, &options).await?
    };
    println!("{} {} ({})", "Picked".green(), picked.get_label().bold(), picked.get_id());

    let registry = ActivityRegistry::new();
    let picked_label = picked.get_label().to_string();
    let provider = ExecuteActivityOptions::new(settings.activity_title.clone())
        .with_success_children(Arc::new(move |id: &ActivityId| vec![ActivityChildItem::new(format!("{}-resource", id), picked_label.clone())]));
    let activity = registry.create_with_options(settings.activity_title.clone(), Arc::new(provider));

    activity.subscribe(Arc::new(|id: &ActivityId, status: ActivityStatus| log::debug!("Activity {} changed, status {}.", id, status)));

    let token = activity.get_cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let result = activity
        .run(|progress, token| async move {
            for quarter in 1..=4 {
                if token.is_cancelled() {
                    return Err(anyhow::Error::new(Error::UserCancelled));
                }
                progress.report(ProgressUpdate::message(format!("{}%", quarter * 25)).with_increment(25.0));
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
            Ok::<_, anyhow::Error>(())
        })
        .await;

    print_state(&activity);
    log::info!("Disposed {} completed activities.", registry.dispose_completed());
    result
}

fn print_state(activity: &Activity) {
    let state = activity.get_state();
    let status = match activity.get_status() {
        ActivityStatus::Succeeded => activity.get_status().to_string().green(),
        ActivityStatus::Failed => activity.get_status().to_string().red(),
        _ => activity.get_status().to_string().normal(),
    };

    println!("{} [{}]", state.label.bold(), status);
    for child in state.get_children(activity.get_id()) {
        println!("  - {}", child.label);
    }
}
