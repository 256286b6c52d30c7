mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod payday;
mod planner;
mod schedule;
mod settings;
mod store;

use clap::Parser;

use cli::{
    AssetCommands, BillCommands, BudgetCommands, Cli, Commands, DebtCommands, DepositCommands,
    GoalCommands, IncomeCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Budget { command } => match command {
            BudgetCommands::Show => cli::budget::show(),
            BudgetCommands::Set {
                monthly_income,
                bills_pct,
                spending_pct,
                savings_pct,
                strategy,
                hysa,
            } => cli::budget::set(
                monthly_income.as_deref(),
                bills_pct,
                spending_pct,
                savings_pct,
                strategy.as_deref(),
                hysa,
            ),
        },
        Commands::Income { command } => match command {
            IncomeCommands::Add { name, amount, frequency, next_payday, primary } => {
                cli::income::add(&name, &amount, &frequency, next_payday.as_deref(), primary)
            }
            IncomeCommands::List => cli::income::list(),
            IncomeCommands::Edit { name, amount, frequency, next_payday, primary } => cli::income::edit(
                &name,
                amount.as_deref(),
                frequency.as_deref(),
                next_payday.as_deref(),
                primary,
            ),
            IncomeCommands::Remove { name } => cli::income::remove(&name),
        },
        Commands::Bill { command } => match command {
            BillCommands::Add {
                name,
                amount,
                due,
                category,
                frequency,
                late_by,
                autopay,
                variable,
                notes,
            } => cli::bills::add(
                &name,
                &amount,
                &due,
                &category,
                &frequency,
                late_by.as_deref(),
                autopay,
                variable,
                notes.as_deref(),
            ),
            BillCommands::List { all } => cli::bills::list(all),
            BillCommands::Pay { name, due } => cli::bills::pay(&name, due.as_deref()),
            BillCommands::Unpay { name, due } => cli::bills::unpay(&name, due.as_deref()),
            BillCommands::Remove { name } => cli::bills::remove(&name),
        },
        Commands::Debt { command } => match command {
            DebtCommands::Add {
                name,
                balance,
                apr,
                due_day,
                minimum_payment,
                original_balance,
                late_by_day,
                statement_day,
                debt_type,
                credit_limit,
                linked_asset,
            } => cli::debts::add(
                &name,
                &balance,
                apr,
                due_day,
                minimum_payment.as_deref(),
                original_balance.as_deref(),
                late_by_day,
                statement_day,
                &debt_type,
                credit_limit.as_deref(),
                linked_asset.as_deref(),
            ),
            DebtCommands::List => cli::debts::list(),
            DebtCommands::Edit {
                name,
                balance,
                apr,
                due_day,
                minimum_payment,
                credit_limit,
                statement_day,
            } => cli::debts::edit(
                &name,
                balance.as_deref(),
                apr,
                due_day,
                minimum_payment.as_deref(),
                credit_limit.as_deref(),
                statement_day,
            ),
            DebtCommands::Remove { name } => cli::debts::remove(&name),
        },
        Commands::Asset { command } => match command {
            AssetCommands::Add { name, value, asset_type, purchase_price, purchase_date, notes } => {
                cli::assets::add(
                    &name,
                    &value,
                    &asset_type,
                    purchase_price.as_deref(),
                    purchase_date.as_deref(),
                    notes.as_deref(),
                )
            }
            AssetCommands::List => cli::assets::list(),
            AssetCommands::Edit { name, value, purchase_price, notes } => cli::assets::edit(
                &name,
                value.as_deref(),
                purchase_price.as_deref(),
                notes.as_deref(),
            ),
            AssetCommands::Remove { name } => cli::assets::remove(&name),
        },
        Commands::Goal { command } => match command {
            GoalCommands::Add { name, target, current, target_date, priority } => {
                cli::goals::add(&name, &target, &current, target_date.as_deref(), priority)
            }
            GoalCommands::List => cli::goals::list(),
            GoalCommands::Edit { name, target, current, target_date, priority } => cli::goals::edit(
                &name,
                target.as_deref(),
                current.as_deref(),
                target_date.as_deref(),
                priority,
            ),
            GoalCommands::Remove { name } => cli::goals::remove(&name),
        },
        Commands::Deposit { command } => match command {
            DepositCommands::Add { name, amount, expected, notes } => {
                cli::deposits::add(&name, &amount, &expected, notes.as_deref())
            }
            DepositCommands::List => cli::deposits::list(),
            DepositCommands::Edit { name, amount, expected, notes } => {
                cli::deposits::edit(&name, amount.as_deref(), expected.as_deref(), notes.as_deref())
            }
            DepositCommands::Receive { name } => cli::deposits::receive(&name),
            DepositCommands::Remove { name } => cli::deposits::remove(&name),
        },
        Commands::Plan { debts, goals } => cli::payday::plan(debts, goals),
        Commands::Complete { yes, debts, goals } => cli::payday::complete(yes, debts, goals),
        Commands::History => cli::payday::history(),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
