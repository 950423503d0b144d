use anyhow::{anyhow, Result};
use clap::Args;
use portal_core::models::Department;
use portal_db::{NewRecord, PgRecordStore, RecordStore};
use sqlx::PgPool;

#[derive(Debug, Args)]
pub struct AddDepartmentArgs {
    /// Display name, unique across departments
    #[arg(short, long)]
    pub name: String,

    /// Optional one-line description shown to staff
    #[arg(short, long)]
    pub description: Option<String>,
}

fn department(args: AddDepartmentArgs) -> Result<Department> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(anyhow!("the department name must not be empty"));
    }
    Ok(Department {
        name: name.to_string(),
        description: args
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}

pub async fn execute(pool: PgPool, args: AddDepartmentArgs) -> Result<()> {
    let department = department(args)?;
    println!("🏢 Adding department '{}'...", department.name);

    let id = PgRecordStore::new(pool)
        .insert(&NewRecord::Department(department))
        .await?;

    println!("✅ Department created. Submissions can use department_id={id}");
    Ok(())
}
