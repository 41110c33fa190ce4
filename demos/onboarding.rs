//! Tenant onboarding walk-through
//!
//! Run with: cargo run --example onboarding

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use masters_core::{
    utils::MemoryStorage, HierarchyPath, HierarchyTable, MastersEngine, NewLedger, SeriesType,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Masters Core Demo ===\n");

    let mut engine = MastersEngine::new(HierarchyTable::builtin(), MemoryStorage::new());
    let tenant = "acme-retail";

    // 1. Seed the tenant's document-number series for the fiscal year.
    println!("1. Seeding document series for FY 2025-26...");
    let fiscal_year_start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let seeded = engine.seed_standard_series(tenant, fiscal_year_start).await?;
    for config in &seeded {
        println!(
            "   {} -> {}{}{}",
            config.series_name,
            config.prefix,
            "0".repeat(config.required_digits),
            config.suffix
        );
    }

    // 2. Create ledgers; codes come from the reference hierarchy.
    println!("\n2. Creating ledgers...");
    let bank_path = HierarchyPath::new("Assets", "Cash and Bank Balances")
        .sub_group_1("Bank")
        .sub_group_2("Bank Accounts");
    let bank = engine
        .create_ledger(
            NewLedger::new(tenant, "HDFC Current A/c", bank_path.clone()).opening_balance("250000"),
        )
        .await?;
    println!("   {} -> code {}", bank.name, bank.code.as_deref().unwrap());

    let second_bank = engine
        .create_ledger(NewLedger::new(tenant, "SBI Current A/c", bank_path).opening_balance("80000"))
        .await?;
    println!(
        "   {} -> code {} (disambiguated)",
        second_bank.name,
        second_bank.code.as_deref().unwrap()
    );

    let rent = engine
        .create_ledger(NewLedger::new(
            tenant,
            "Office Rent",
            HierarchyPath::new("Expenses", "Indirect Expenses"),
        ))
        .await?;
    println!("   {} -> code {}", rent.name, rent.code.as_deref().unwrap());

    // 3. Cash/bank ledgers got opening-balance rows automatically.
    println!("\n3. Derived opening balances:");
    for ledger in [&bank, &second_bank] {
        let rows = engine.ledger_transactions(tenant, &ledger.id).await?;
        let balance: BigDecimal = rows[0].balance.clone();
        println!("   {} opening balance = {}", ledger.name, balance);
    }
    let rent_rows = engine.ledger_transactions(tenant, &rent.id).await?;
    println!("   {} derived rows = {} (not cash/bank)", rent.name, rent_rows.len());

    // 4. Allocate some document numbers.
    println!("\n4. Document numbers:");
    let on_date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    for _ in 0..3 {
        let number = engine
            .allocate_number(tenant, SeriesType::Sales, "Sales Invoice", on_date)
            .await?;
        println!("   sales invoice -> {number}");
    }
    let receipt = engine
        .allocate_number(tenant, SeriesType::Receipt, "Receipt Voucher", on_date)
        .await?;
    println!("   receipt voucher -> {receipt}");

    // 5. Backfill finds nothing to do: the engine kept the tables in sync.
    println!("\n5. Running backfill...");
    let created = engine.backfill(tenant).await?;
    println!("   created {created} missing opening rows");

    println!("\n=== Demo completed ===");
    Ok(())
}
