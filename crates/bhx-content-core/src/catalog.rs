//! Fixed catalog of renter services and the neighborhoods they are offered
//! in. Every service is listed in every location, so the landing pages and
//! sitemap cover the full cross product.

use serde::Serialize;

use Borough::{Bronx, Brooklyn, Manhattan, Queens, StatenIsland};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Borough {
    Manhattan,
    Brooklyn,
    Queens,
    Bronx,
    #[serde(rename = "Staten Island")]
    StatenIsland,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: &'static str,
    pub slug: &'static str,
    /// Used in copy such as "a moving company".
    pub singular: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub name: &'static str,
    pub slug: &'static str,
    pub borough: Borough,
}

/// One `/services/{service}/{location}` landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceLocation {
    pub service: &'static Service,
    pub location: &'static Location,
}

impl ServiceLocation {
    pub fn path(&self) -> String {
        format!("/services/{}/{}", self.service.slug, self.location.slug)
    }
}

const fn service(name: &'static str, slug: &'static str, singular: &'static str) -> Service {
    Service {
        name,
        slug,
        singular,
    }
}

const fn location(borough: Borough, name: &'static str, slug: &'static str) -> Location {
    Location {
        name,
        slug,
        borough,
    }
}

pub static SERVICES: [Service; 6] = [
    service("Moving Companies", "moving-companies", "moving company"),
    service("Tenant Lawyers", "tenant-lawyers", "tenant lawyer"),
    service("Renters Insurance", "renters-insurance", "renter's insurance"),
    service("Pest Control", "pest-control", "pest control provider"),
    service("Storage Facilities", "storage-facilities", "storage facility"),
    service("Building Inspectors", "building-inspectors", "building inspector"),
];

pub static LOCATIONS: [Location; 29] = [
    location(Manhattan, "Upper East Side", "upper-east-side"),
    location(Manhattan, "Upper West Side", "upper-west-side"),
    location(Manhattan, "Harlem", "harlem"),
    location(Manhattan, "East Village", "east-village"),
    location(Manhattan, "West Village", "west-village"),
    location(Manhattan, "Chelsea", "chelsea"),
    location(Manhattan, "Tribeca", "tribeca"),
    location(Manhattan, "Hell's Kitchen", "hells-kitchen"),
    location(Brooklyn, "Williamsburg", "williamsburg"),
    location(Brooklyn, "Bushwick", "bushwick"),
    location(Brooklyn, "Bedford-Stuyvesant", "bedford-stuyvesant"),
    location(Brooklyn, "Park Slope", "park-slope"),
    location(Brooklyn, "Downtown Brooklyn", "downtown-brooklyn"),
    location(Brooklyn, "DUMBO", "dumbo"),
    location(Brooklyn, "Crown Heights", "crown-heights"),
    location(Brooklyn, "Greenpoint", "greenpoint"),
    location(Queens, "Astoria", "astoria"),
    location(Queens, "Long Island City", "long-island-city"),
    location(Queens, "Flushing", "flushing"),
    location(Queens, "Jackson Heights", "jackson-heights"),
    location(Queens, "Ridgewood", "ridgewood"),
    location(Queens, "Sunnyside", "sunnyside"),
    location(Bronx, "Fordham", "fordham"),
    location(Bronx, "Kingsbridge", "kingsbridge"),
    location(Bronx, "Riverdale", "riverdale"),
    location(Bronx, "Mott Haven", "mott-haven"),
    location(Bronx, "Pelham Bay", "pelham-bay"),
    location(StatenIsland, "St. George", "st-george"),
    location(StatenIsland, "Stapleton", "stapleton"),
];

pub fn service_by_slug(slug: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.slug == slug)
}

pub fn location_by_slug(slug: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|l| l.slug == slug)
}

/// Both halves of a landing page, if both slugs are known.
pub fn combo(service_slug: &str, location_slug: &str) -> Option<ServiceLocation> {
    Some(ServiceLocation {
        service: service_by_slug(service_slug)?,
        location: location_by_slug(location_slug)?,
    })
}

/// Every service in every location, service-major, catalog order.
pub fn all_combos() -> impl Iterator<Item = ServiceLocation> {
    SERVICES.iter().flat_map(|service| {
        LOCATIONS
            .iter()
            .map(move |location| ServiceLocation { service, location })
    })
}
