#![allow(dead_code)]

use compliance_engine::config::EngineConfig;
use compliance_engine::workflows::pipeline::PipelineInputs;

pub const REGISTERED_HEADER: &str = "Registration Number,Entity Type,Ownership Type,Occupancy Classification,Billing Type,Metering Type,Province,City,Size,No. of Floors,Grid Usage,Gas Usage,Liquid Fuel Usage,Solid Fuel Usage,Renewable Usage,Other Usage,Is Smart Metered?";

/// Four buildings covering every score band; see the assertions for the arithmetic.
pub const REGISTERED_CSV: &str = "\
Registration Number,Entity Type,Ownership Type,Occupancy Classification,Billing Type,Metering Type,Province,City,Size,No. of Floors,Grid Usage,Gas Usage,Liquid Fuel Usage,Solid Fuel Usage,Renewable Usage,Other Usage,Is Smart Metered?
ABC123,National Department,State Owned,Office,Municipal,Conventional,Gauteng,Pretoria,Large,12,100,0,0,0,0,0,No
XYZ789,Provincial Department,State Owned,Hospital,Municipal,Smart,Western Cape,Cape Town,Large,3,50,20,0,0,0,0,Yes
LMN456,Municipality,Leased,School,Prepaid,Smart,Limpopo,Polokwane,Small,1,0,0,0,0,0,0,yes
QRS111,Municipality,State Owned,Office,Municipal,Conventional,Gauteng,Johannesburg,Medium,6,10,0,0,0,0,0,No
";

pub const CERTIFIED_CSV: &str = "\
Registration Number,Entity Type,Ownership Type,Occupancy Classification,Province,City
ABC123,National Department,State Owned,Office,Gauteng,Pretoria
 LMN456 ,Municipality,Leased,School,Limpopo,Polokwane
ORPHAN1,Municipality,State Owned,Library,Free State,Bloemfontein
";

pub fn inputs(registered: &str, certified: &str) -> PipelineInputs {
    PipelineInputs::from_bytes(registered.as_bytes(), certified.as_bytes())
}

pub fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.forest.n_trees = 30;
    config
}

/// `size` buildings where every fourth one is tall, unmetered and uncertified.
pub fn generated_population(size: usize) -> (String, String) {
    let provinces = [
        ("Gauteng", "Pretoria"),
        ("KwaZulu-Natal", "Durban"),
        ("Eastern Cape", "Gqeberha"),
    ];
    let mut registered = String::from(REGISTERED_HEADER);
    registered.push('\n');
    let mut certified = String::from("Registration Number,Province\n");

    for index in 0..size {
        let (province, city) = provinces[index % provinces.len()];
        let key = format!("GEN-{index:04}");
        if index % 4 == 0 {
            registered.push_str(&format!(
                "{key},Municipality,State Owned,Office,Municipal,Conventional,{province},{city},Large,14,900,0,0,0,0,0,No\n"
            ));
        } else {
            registered.push_str(&format!(
                "{key},Municipality,State Owned,Office,Municipal,Smart,{province},{city},Small,1,0,0,0,0,0,0,Yes\n"
            ));
            certified.push_str(&format!("{key},{province}\n"));
        }
    }

    (registered, certified)
}
