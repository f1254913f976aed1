//! Premium command: buy, restore or inspect premium

use anyhow::Result;
use colored::Colorize;
use pindrop_core::premium::{PaymentOutcome, PremiumError};
use pindrop_core::{PlanCatalog, PlanId, PremiumState};

use crate::checkout::BrowserCheckout;
use crate::session::{Session, SessionPremium};

#[derive(Debug, Clone, clap::Subcommand)]
pub enum PremiumAction {
    /// Show current premium status
    Status,
    /// List available plans
    Plans,
    /// Buy a plan through the browser checkout
    Upgrade {
        /// monthly or lifetime
        #[arg(long, default_value = "monthly")]
        plan: PlanId,
        /// Email for the receipt
        #[arg(long)]
        email: String,
    },
    /// Restore a purchase using the transaction reference from the receipt
    Restore {
        #[arg(long)]
        reference: String,
        /// Email used at payment
        #[arg(long)]
        email: String,
    },
    /// Remove premium status from this machine
    Clear,
}

/// Runs `pindrop premium` with the given action. No action shows status
/// followed by the plan list.
pub fn run(action: Option<&PremiumAction>, cli: &crate::Cli) -> Result<()> {
    let mut session = Session::open(cli)?;

    match action {
        Some(PremiumAction::Status) => run_status(&mut session),
        Some(PremiumAction::Plans) => {
            print_plans(session.premium.catalog());
            Ok(())
        }
        Some(PremiumAction::Upgrade { plan, email }) => run_upgrade(&mut session, *plan, email),
        Some(PremiumAction::Restore { reference, email }) => {
            run_restore(&mut session.premium, reference, email)
        }
        Some(PremiumAction::Clear) => {
            session.premium.clear();
            eprintln!("  {} Premium status removed.", "\u{2713}".green());
            Ok(())
        }
        None => {
            run_status(&mut session)?;
            print_plans(session.premium.catalog());
            Ok(())
        }
    }
}

fn run_status(session: &mut Session) -> Result<()> {
    if session.premium.is_verifying() {
        eprint!("  Verifying... ");
        session.settle();
        if session.premium.is_verifying() {
            eprintln!("{}", "offline".yellow());
        } else {
            eprintln!("{}", "done".green());
        }
    }
    print_state(session.premium.state());
    Ok(())
}

fn run_upgrade(session: &mut Session, plan: PlanId, email: &str) -> Result<()> {
    // A stale startup check must not land on top of the new purchase.
    session.settle();
    if session.premium.is_entitled() {
        eprintln!("  {}", "Premium is already active.".green());
        print_state(session.premium.state());
        return Ok(());
    }

    let gateway = BrowserCheckout::new(session.config.payment.checkout_url.clone());
    match session.premium.init_payment(plan, email, &gateway) {
        Ok(PaymentOutcome::Activated(plan)) => {
            eprintln!();
            eprintln!(
                "  {} Premium {} activated. Thanks for supporting PinDrop!",
                "\u{2713}".green(),
                plan.to_string().cyan()
            );
            print_state(session.premium.state());
        }
        Ok(PaymentOutcome::Closed) => {
            eprintln!("  {}", "Checkout closed. No payment was taken.".dimmed());
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn run_restore(premium: &mut SessionPremium, reference: &str, email: &str) -> Result<()> {
    eprint!("  Verifying purchase... ");
    match premium.restore_by_reference(reference, email) {
        Ok(plan) => {
            eprintln!("{}", "done".green());
            eprintln!(
                "  {} Premium {} restored.",
                "\u{2713}".green(),
                plan.to_string().cyan()
            );
            print_state(premium.state());
        }
        Err(e) => {
            eprintln!("{}", "failed".red());
            report(&e);
        }
    }
    Ok(())
}

fn report(e: &PremiumError) {
    eprintln!("  {} {}", "Error:".red().bold(), e);
    if e.is_retryable() {
        eprintln!("  {}", "Please try again in a moment.".dimmed());
    }
}

fn print_state(state: &PremiumState) {
    let tier = if state.entitled {
        "Premium".green()
    } else {
        "Free".normal()
    };
    eprintln!("  {}: {}", "Tier".bold(), tier);

    if let Some(ref record) = state.record {
        eprintln!("  {}: {}", "Plan".bold(), record.plan.to_string().cyan());
        eprintln!("  {}: {}", "Email".bold(), record.email);
    }
    if let Some(ref err) = state.error {
        eprintln!("  {}: {}", "Last error".bold(), err.dimmed());
    }
    eprintln!();
}

fn print_plans(catalog: &PlanCatalog) {
    for plan in catalog.iter() {
        eprintln!(
            "  {:<9} {:>6}  {}",
            plan.label.bold(),
            plan.display_price(),
            plan.description.dimmed()
        );
    }
    eprintln!();
    eprintln!(
        "  Upgrade with {}",
        "pindrop premium upgrade --plan <PLAN> --email <EMAIL>".bold()
    );
    eprintln!();
}
