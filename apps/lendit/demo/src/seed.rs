use chrono::{DateTime, Duration, Utc};
use domain_lending::{Clock, CreateItem, CreateUser, ItemCategory, LendingService, User};
use std::collections::HashMap;
use tracing::info;

/// Residents of the demo community: (name, hostel, room)
const RESIDENTS: &[(&str, &str, &str)] = &[
    ("Demo User", "North Wing", "302"),
    ("Sarah Chen", "North Wing", "405"),
    ("Rahul Sharma", "South Wing", "201"),
    ("Priya Patel", "South Wing", "308"),
    ("John Smith", "South Wing", "215"),
    ("Amit Kumar", "East Wing", "156"),
    ("David Lee", "North Wing", "402"),
    ("Anjali Verma", "East Wing", "510"),
];

/// Catalog listings: (owner, name, category, description)
const CATALOG: &[(&str, &str, ItemCategory, &str)] = &[
    (
        "Sarah Chen",
        "iPhone Charger",
        ItemCategory::Electronics,
        "Original Apple lightning cable and adapter. Works perfectly.",
    ),
    (
        "Rahul Sharma",
        "Data Structures Textbook",
        ItemCategory::Books,
        "Introduction to Algorithms by CLRS. Slight wear but all pages intact.",
    ),
    (
        "Priya Patel",
        "Badminton Racket",
        ItemCategory::Sports,
        "Yonex racket with cover. Great condition.",
    ),
    (
        "Sarah Chen",
        "USB-C Hub",
        ItemCategory::Electronics,
        "7-in-1 hub with HDMI, USB 3.0, and card reader.",
    ),
    (
        "Amit Kumar",
        "Electric Kettle",
        ItemCategory::Kitchen,
        "1.5L capacity, barely used. Perfect for tea/coffee.",
    ),
    (
        "David Lee",
        "Guitar (Acoustic)",
        ItemCategory::MusicalInstruments,
        "Yamaha F310. Great for beginners. Includes picks.",
    ),
    (
        "Rahul Sharma",
        "Bluetooth Speaker",
        ItemCategory::Electronics,
        "JBL Flip 5. Waterproof, 12hr battery life.",
    ),
    (
        "Anjali Verma",
        "Iron Box",
        ItemCategory::Appliances,
        "Steam iron, works perfectly. Handle with care.",
    ),
];

/// Seeded community, residents keyed by name
pub struct Community {
    pub residents: HashMap<&'static str, User>,
}

impl Community {
    pub fn resident(&self, name: &str) -> eyre::Result<&User> {
        self.residents
            .get(name)
            .ok_or_else(|| eyre::eyre!("no resident named {}", name))
    }
}

fn email_for(name: &str) -> String {
    format!("{}@lendit.example", name.to_lowercase().replace(' ', "."))
}

/// Register every resident, list the catalog and replay the open loans:
/// the racket lent to John Smith and the guitar requested by Demo User.
pub async fn seed<C: Clock>(
    service: &LendingService<C>,
    now: DateTime<Utc>,
) -> eyre::Result<Community> {
    let mut residents = HashMap::new();
    for &(name, hostel, room) in RESIDENTS {
        let user = service
            .register_user(CreateUser {
                name: name.to_string(),
                email: email_for(name),
                hostel: hostel.to_string(),
                room: room.to_string(),
            })
            .await?;
        residents.insert(name, user);
    }
    let community = Community { residents };

    let mut listed = HashMap::new();
    for &(owner, name, category, description) in CATALOG {
        let listing = service
            .list_item(
                community.resident(owner)?.id,
                CreateItem {
                    name: name.to_string(),
                    category: Some(category),
                    description: description.to_string(),
                },
            )
            .await?;
        listed.insert(name, listing.item.id);
    }

    let listed_id = |name: &str| {
        listed
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no listing named {}", name))
    };

    let request = service
        .request_item(community.resident("John Smith")?.id, listed_id("Badminton Racket")?)
        .await?;
    service
        .accept_request(
            community.resident("Priya Patel")?.id,
            request.request.id,
            now + Duration::days(5),
        )
        .await?;

    service
        .request_item(community.resident("Demo User")?.id, listed_id("Guitar (Acoustic)")?)
        .await?;

    info!(
        residents = community.residents.len(),
        items = listed.len(),
        "Seeded demo community"
    );
    Ok(community)
}
