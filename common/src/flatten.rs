//! カテゴリ平坦化
//!
//! 細かいカテゴリ名を固定の大分類（"Food & Dining" など）へ振り分ける。
//! ラベルを `snake_key` に変換し、規則表を上から順に部分一致で判定する。
//! キーワードに当たり、除外語に当たらない最初の規則を採用する。
//! どれにも当たらなければ `DEFAULT_BUCKET`。

use crate::normalizer::snake_key;
use std::collections::BTreeMap;

pub const DEFAULT_BUCKET: &str = "Other Services";

/// 振り分け規則
#[derive(Debug, Clone, Copy)]
pub struct BucketRule {
    pub bucket: &'static str,
    pub keywords: &'static [&'static str],
    pub exclusions: &'static [&'static str],
}

impl BucketRule {
    pub fn matches(&self, key: &str) -> bool {
        self.keywords.iter().any(|k| key.contains(k))
            && !self.exclusions.iter().any(|x| key.contains(x))
    }
}

pub const BUCKET_RULES: &[BucketRule] = &[
    BucketRule {
        bucket: "Food & Dining",
        keywords: &[
            "restaurant", "cafe", "coffee", "food", "dining", "bar", "pub", "brewery", "winery",
            "bakery", "pizza", "burger", "sandwich", "diner", "bistro", "eatery", "caterer",
            "donuts", "ice_cream", "dessert", "candy", "chocolate", "patisserie", "bagel", "taco",
            "barbecue", "steakhouse", "gastropub", "brasserie", "lounge", "_bar", "cocktail",
            "wine_bar", "beer_bar", "speakeasy", "champagne_bar", "sake_bar", "hookah",
            "cigar_bar", "tea_room", "juice_bar", "smoothie", "meat_shop", "butcher", "seafood",
            "delicatessen", "cheese_shop", "pasta_shop", "pie_shop", "cupcake", "empanadas",
            "pretzel", "popcorn", "hot_dog", "chicken_wings", "poke", "doner", "falafel",
            "dumpling", "noodles", "sushi", "dim_sum", "waffle", "pancake", "gelato",
            "frozen_yoghurt", "shaved_ice", "acai", "kombucha", "bubble_tea", "cidery",
            "distillery", "eat_and_drink", "tapas",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Healthcare & Medical",
        keywords: &[
            "doctor", "physician", "medical", "health", "clinic", "hospital", "dentist", "dental",
            "surgeon", "surgery", "therapist", "therapy", "chiropractor", "acupuncture",
            "optometrist", "ophthalmologist", "podiatrist", "dermatologist", "cardiologist",
            "neurologist", "oncologist", "pediatric", "obstetrician", "gynecologist", "urologist",
            "radiologist", "anesthesiologist", "pathologist", "psychiatrist", "psychologist",
            "counselor", "psychotherapist", "pharmacy", "medicine", "veterinarian", "veterinary",
            "animal_hospital", "emergency_room", "urgent_care", "rehabilitation", "hospice",
            "nursing", "dialysis", "orthopedist", "allergist", "endocrinologist",
            "gastroenterologist", "nephrologist", "pulmonologist", "rheumatologist", "hematology",
            "hepatologist", "proctologist", "toxicologist", "immunologist", "geneticist",
            "retina_specialist", "otologist", "audiologist", "speech_therapist",
            "occupational_therapy", "physical_therapy", "massage_therapy", "naturopathic",
            "holistic", "alternative_medicine", "homeopathic", "ayurveda", "acne_treatment",
            "laser_eye", "cannabis_clinic", "fertility", "midwife", "doula", "maternity",
            "prenatal", "lactation", "abortion", "mohel",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Retail & Shopping",
        keywords: &[
            "store", "shop", "retail", "boutique", "market", "supermarket", "grocery",
            "department_store", "discount_store", "outlet", "thrift", "pawn", "convenience_store",
            "drugstore", "mall", "shopping_center", "bookstore", "toy_store", "gift_shop",
            "souvenir", "clothing", "apparel", "shoe_store", "jewelry_store", "watch_store",
            "eyewear", "optical", "furniture_store", "home_goods", "hardware_store", "paint_store",
            "flooring_store", "carpet_store", "tile_store", "lighting_store", "appliance_store",
            "electronics", "computer_store", "mobile_phone_store", "sporting_goods",
            "outdoor_gear", "bike_shop", "surf_shop", "dive_shop", "gun_and_ammo", "pet_store",
            "aquatic_pet", "bird_shop", "reptile_shop", "art_supply", "craft_shop",
            "fabric_store", "knitting", "yarn", "music_store", "instrument_store", "vinyl_record",
            "video_game_store", "comic_books", "antique", "vintage", "flea_market",
            "farmers_market", "shopping", "superstore", "kiosk", "dispensary", "liquor_store",
            "tobacco_shop", "vape", "e_cigarette",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Automotive",
        keywords: &[
            "auto", "automotive", "car_", "vehicle", "truck_", "motorcycle", "scooter_dealer",
            "dealer", "repair", "mechanic", "tire", "brake", "transmission", "muffler",
            "body_shop", "detailing", "car_wash", "towing", "gas_station", "fuel_", "oil_change",
            "smog", "inspection", "emissions", "windshield", "window_tint", "upholstery",
            "customization", "restoration",
        ],
        exclusions: &["museum"],
    },
    BucketRule {
        bucket: "Beauty & Wellness",
        keywords: &[
            "salon", "barber", "hair_", "nail_", "spa", "beauty", "esthetician", "aesthetician",
            "massage", "facial", "wax", "laser_hair", "eyelash", "eyebrow", "tanning", "tattoo",
            "piercing", "makeup", "cosmetic", "skin_care", "aromatherapy", "reiki",
            "halotherapy", "cryotherapy", "hydrotherapy", "float_spa", "sauna", "fitness", "gym",
            "yoga", "pilates", "boxing", "martial_arts", "karate", "taekwondo", "jiu_jitsu",
            "muay_thai", "kickboxing", "boot_camp", "trainer", "weight_loss", "nutrition",
            "dietitian", "health_coach", "blow_dry", "threading", "sugaring", "boudoir",
        ],
        exclusions: &["supply", "school", "product", "manufacturer"],
    },
    BucketRule {
        bucket: "Sports & Recreation",
        keywords: &[
            "sports", "stadium", "arena", "field", "court", "track", "pitch", "golf", "bowling",
            "skating", "ski_", "climbing", "swimming_pool", "tennis", "basketball", "football",
            "soccer", "baseball", "hockey", "volleyball", "rugby", "cricket", "squash",
            "racquetball", "handball", "badminton", "table_tennis", "bocce", "disc_golf",
            "mini_golf", "go_kart", "race_track", "shooting_range", "archery", "paintball",
            "laser_tag", "trampoline", "bounce_house", "batting_cage", "skate_park", "bmx",
            "mountain_bike", "trail", "hiking", "scuba", "diving", "snorkel", "surf", "kite",
            "paddle", "kayak", "canoe", "sailing", "rowing", "fishing", "hunting", "horse_",
            "equestrian", "ski_resort", "tubing", "sledding", "snowboard", "ice_rink", "aerial",
            "rock_climbing", "bouldering",
        ],
        exclusions: &["museum", "store", "equipment"],
    },
    BucketRule {
        bucket: "Arts & Entertainment",
        keywords: &[
            "museum", "gallery", "theater", "theatre", "cinema", "movie", "performing_arts",
            "concert", "music_venue", "comedy", "nightclub", "dance_club", "amusement",
            "theme_park", "water_park", "zoo", "aquarium", "botanical", "casino", "arcade",
            "escape_room", "virtual_reality", "festival", "fair", "carnival", "circus", "rodeo",
            "haunted_house", "observatory", "planetarium", "artist", "art_", "cultural_center",
            "karaoke", "bingo", "magic", "clown", "entertainment", "production", "studio",
            "recording", "rehearsal", "band", "orchestra", "choir", "opera", "ballet",
            "dance_school", "drama", "acting",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Education",
        keywords: &[
            "school", "university", "college", "education", "academy", "institute",
            "kindergarten", "preschool", "day_care", "daycare", "elementary", "middle_school",
            "high_school", "tutoring", "training", "class", "lesson", "instructor", "teacher",
            "coach", "library", "student_union", "montessori", "waldorf", "charter_school",
            "vocational", "technical_school",
        ],
        exclusions: &["driving", "traffic", "bartending"],
    },
    BucketRule {
        bucket: "Accommodation & Lodging",
        keywords: &[
            "hotel", "motel", "inn", "resort", "lodge", "hostel", "bed_and_breakfast",
            "vacation_rental", "cottage", "cabin", "apartment", "condominium", "housing",
            "accommodation", "campground", "rv_park", "guest_house", "pension", "houseboat",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Professional Services",
        keywords: &[
            "lawyer", "attorney", "law", "legal", "accountant", "bookkeeper", "tax_service",
            "financial", "consultant", "consulting", "marketing", "advertising",
            "public_relations", "design", "architect", "engineer", "management", "hr_",
            "human_resource", "employment", "recruiting", "temp_agency", "notary", "paralegal",
            "mediator", "appraisal", "web_designer", "graphic_designer", "photographer",
            "videographer", "writer", "editor", "translation", "interpreter", "transcription",
        ],
        exclusions: &["museum", "school"],
    },
    BucketRule {
        bucket: "Financial Services",
        keywords: &[
            "bank", "credit_union", "atm", "insurance", "loan", "mortgage", "investment",
            "financial", "broker", "stock", "currency_exchange", "check_cashing", "payday",
            "bail_bonds", "credit_counseling", "debt_relief", "accounting", "tax_", "bookkeeping",
        ],
        exclusions: &["museum"],
    },
    BucketRule {
        bucket: "Real Estate",
        keywords: &[
            "real_estate", "property_management", "apartment_agent", "housing", "developer",
            "home_staging", "home_inspector",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Construction & Contractors",
        keywords: &[
            "contractor", "construction", "builder", "plumbing", "electrician", "hvac", "roofing",
            "carpenter", "mason", "concrete", "drywall", "painting", "remodeling", "renovation",
            "foundation", "excavation", "demolition", "tiling", "flooring", "siding",
            "insulation", "waterproof", "septic", "well_drilling", "paving",
        ],
        exclusions: &["school", "supply"],
    },
    BucketRule {
        bucket: "Home & Garden Services",
        keywords: &[
            "landscaping", "lawn", "gardener", "tree_service", "pest_control", "cleaning",
            "janitorial", "maid", "window_washing", "carpet_cleaning", "gutter", "fence", "deck",
            "patio", "pool_cleaning", "handyman", "locksmith", "security_system", "garage_door",
            "door_service", "appliance_repair", "junk_removal", "hauling", "moving", "movers",
            "snow_removal", "pressure_washing", "chimney",
        ],
        exclusions: &["store", "supply"],
    },
    BucketRule {
        bucket: "Government & Public Services",
        keywords: &[
            "government", "city_hall", "town_hall", "courthouse", "dmv", "motor_vehicle",
            "post_office", "police", "fire_department", "emergency_service", "social_security",
            "unemployment", "welfare", "public_health", "department_of", "office_of", "bureau",
            "agency", "commission", "federal", "state", "local", "municipal", "civic", "embassy",
            "military", "army", "navy", "armed_forces", "national_security", "jail", "prison",
            "detention", "passport", "visa", "customs",
        ],
        exclusions: &["school", "museum"],
    },
    BucketRule {
        bucket: "Utilities & Infrastructure",
        keywords: &[
            "utility", "electric", "power_plant", "energy", "water_supplier", "sewage",
            "sanitation", "waste", "garbage", "recycling", "telecommunications", "internet",
            "cable", "phone_service", "pipeline", "dam", "bridge", "tunnel", "toll_station",
        ],
        exclusions: &["repair", "installation"],
    },
    BucketRule {
        bucket: "Religious & Spiritual",
        keywords: &[
            "church", "temple", "mosque", "synagogue", "cathedral", "chapel", "religious",
            "spiritual", "monastery", "convent", "shrine", "meditation", "buddhist", "hindu",
            "christian", "catholic", "protestant", "episcopal", "baptist", "pentecostal",
            "evangelical", "jehovah", "sikh", "mission", "parish", "astrologer", "psychic",
            "mystic",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Transportation",
        keywords: &[
            "airport", "train_station", "bus_station", "metro", "subway", "transit", "ferry",
            "port", "terminal", "taxi", "ride_sharing", "limo", "shuttle", "transportation",
            "parking", "airline", "railway", "railroad", "seaplane", "heliport", "cable_car",
            "light_rail",
        ],
        exclusions: &["museum", "repair", "dealer"],
    },
    BucketRule {
        bucket: "Tourism & Attractions",
        keywords: &[
            "tourist", "attraction", "tours", "sightseeing", "visitor_center", "lighthouse",
            "monument", "landmark", "castle", "palace", "fort", "historical", "memorial",
            "sculpture", "statue", "fountain", "lookout", "observation", "scenic",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Parks & Natural Features",
        keywords: &[
            "park", "playground", "garden", "nature_reserve", "national_park", "state_park",
            "wildlife", "sanctuary", "preserve", "mountain", "hill", "valley", "canyon", "cave",
            "forest", "desert", "beach", "coast", "island", "lake", "river", "waterfall",
            "spring", "dam", "reservoir", "marsh", "wetland", "dune", "cliff", "volcano",
            "geyser", "hot_springs",
        ],
        exclusions: &["amusement", "theme", "water_park"],
    },
    BucketRule {
        bucket: "Agriculture & Farming",
        keywords: &[
            "farm", "ranch", "orchard", "vineyard", "agriculture", "agricultural", "livestock",
            "cattle", "dairy", "poultry", "pig_", "fish_farm", "crop", "grain", "produce",
            "harvest", "bee", "honey", "apiary", "csa_farm", "urban_farm", "pumpkin_patch",
            "pick_your_own",
        ],
        exclusions: &["insurance", "equipment", "supply"],
    },
    BucketRule {
        bucket: "Manufacturing & Industrial",
        keywords: &[
            "manufacturing", "manufacturer", "factory", "plant", "mill", "foundry", "refinery",
            "industrial", "production", "assembly", "fabrication", "processing", "packaging",
            "bottling", "printing", "publishing", "textile", "chemical", "plastic", "metal",
            "steel", "iron", "lumber", "paper", "warehouse", "distribution", "mining", "quarry",
            "oil_and_gas", "petroleum", "coal",
        ],
        exclusions: &["store", "repair"],
    },
    BucketRule {
        bucket: "Media & Communications",
        keywords: &[
            "media", "newspaper", "magazine", "radio_station", "tv_station", "television_station",
            "broadcasting", "publisher", "press", "news", "journalism", "social_media",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Technology & IT",
        keywords: &[
            "software", "it_", "computer_repair", "tech_support", "web_hosting", "data_recovery",
            "network", "cybersecurity", "biotechnology", "scientific_laboratory",
            "research_institute",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Event Services",
        keywords: &[
            "event_planning", "wedding_planning", "party_", "catering", "venue", "dj_",
            "entertainment_service", "rental_service", "photo_booth", "balloon_", "florist",
            "floral",
        ],
        exclusions: &["supply"],
    },
    BucketRule {
        bucket: "Pet Services",
        keywords: &[
            "pet_", "dog_", "animal_", "veterinary", "groomer", "boarding", "training", "walker",
            "sitter", "adoption", "shelter", "rescue",
        ],
        exclusions: &["store", "hospital", "supply"],
    },
    BucketRule {
        bucket: "Personal Services",
        keywords: &[
            "tailor", "alterations", "dry_cleaning", "laundry", "shoe_repair", "watch_repair",
            "jewelry_repair", "engraving", "framing", "photo_", "portrait", "life_coach",
            "personal_trainer", "personal_chef", "personal_assistant", "concierge", "valet",
            "matchmaker", "dating",
        ],
        exclusions: &["supply", "equipment"],
    },
    BucketRule {
        bucket: "Community & Social Services",
        keywords: &[
            "community_center", "social_service", "charity", "non_profit", "nonprofit",
            "volunteer", "donation", "shelter", "homeless", "food_bank", "community_garden",
            "youth", "senior", "elder", "disability", "counseling", "crisis",
            "suicide_prevention", "abuse", "addiction", "rehabilitation", "foster_care",
            "adoption", "veterans", "refugee", "fraternal", "association", "organization",
            "union",
        ],
        exclusions: &[],
    },
    BucketRule {
        bucket: "Business-to-Business",
        keywords: &["b2b", "distributor", "supplier"],
        exclusions: &[],
    },
];

/// 大分類を判定
pub fn simplify(label: &str) -> &'static str {
    simplify_with(BUCKET_RULES, label)
}

/// 規則表を指定して大分類を判定
pub fn simplify_with(rules: &[BucketRule], label: &str) -> &'static str {
    let key = snake_key(label);
    if key.is_empty() {
        return DEFAULT_BUCKET;
    }
    rules
        .iter()
        .find(|rule| rule.matches(&key))
        .map(|rule| rule.bucket)
        .unwrap_or(DEFAULT_BUCKET)
}

/// 大分類ごとの件数（名前順）
pub fn bucket_counts<'a>(labels: impl IntoIterator<Item = &'a str>) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(simplify(label)).or_insert(0) += 1;
    }
    counts
}

/// 既知の大分類の一覧（規則表の順 + 既定値）
pub fn known_buckets() -> Vec<&'static str> {
    let mut buckets: Vec<&'static str> = Vec::new();
    for rule in BUCKET_RULES {
        if !buckets.contains(&rule.bucket) {
            buckets.push(rule.bucket);
        }
    }
    buckets.push(DEFAULT_BUCKET);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_buckets() {
        assert_eq!(simplify("fast_food_restaurant"), "Food & Dining");
        assert_eq!(simplify("veterinarian"), "Healthcare & Medical");
        assert_eq!(simplify("totally_unknown_xyz"), "Other Services");
    }

    #[test]
    fn test_human_readable_labels() {
        assert_eq!(simplify("Fast Food Restaurant"), "Food & Dining");
        assert_eq!(simplify("Ice Cream Shop"), "Food & Dining");
        assert_eq!(simplify("Hardware Store"), "Retail & Shopping");
    }

    #[test]
    fn test_exclusion_falls_through() {
        // Automotive は museum を除外 → Arts & Entertainment へ
        assert_eq!(simplify("automotive_museum"), "Arts & Entertainment");
        // Beauty & Wellness は school を除外 → Education へ
        assert_eq!(simplify("beauty_school"), "Education");
    }

    #[test]
    fn test_priority_order() {
        // "car_wash" は Automotive より前の規則に当たらない
        assert_eq!(simplify("car_wash"), "Automotive");
        // "wine_bar" は Food & Dining が先
        assert_eq!(simplify("wine_bar"), "Food & Dining");
    }

    #[test]
    fn test_b2b() {
        assert_eq!(simplify("industrial_equipment_supplier"), "Manufacturing & Industrial");
        assert_eq!(simplify("b2b_services"), "Business-to-Business");
    }

    #[test]
    fn test_empty_label_is_default() {
        assert_eq!(simplify(""), DEFAULT_BUCKET);
    }

    #[test]
    fn test_bucket_counts() {
        let counts = bucket_counts(["pizza_restaurant", "cafe", "bank", "nothing_here_qq"]);
        assert_eq!(counts.get("Food & Dining"), Some(&2));
        assert_eq!(counts.get("Financial Services"), Some(&1));
        assert_eq!(counts.get(DEFAULT_BUCKET), Some(&1));
    }

    #[test]
    fn test_known_buckets() {
        let buckets = known_buckets();
        assert_eq!(buckets.first(), Some(&"Food & Dining"));
        assert_eq!(buckets.last(), Some(&DEFAULT_BUCKET));
    }
}
