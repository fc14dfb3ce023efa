//! Static catalog describing each [`ServiceType`] for display.

use serde::Serialize;

use crate::models::ServiceType;

/// Display information for one service type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeInfo {
    pub id: ServiceType,
    pub name: &'static str,
    pub description: &'static str,
    pub price_range: &'static str,
    pub slug: &'static str,
}

/// Catalog entry for a single type.
pub fn service_type_info(service_type: ServiceType) -> ServiceTypeInfo {
    let (name, description, price_range) = match service_type {
        ServiceType::AssistedLiving => (
            "Assisted Living",
            "Support with daily activities while maintaining independence.",
            "$3,500-$6,500/mo",
        ),
        ServiceType::MemoryCare => (
            "Memory Care",
            "Specialized care for Alzheimer's and dementia conditions.",
            "$5,500-$8,500/mo",
        ),
        ServiceType::NursingHome => (
            "Nursing Home",
            "24/7 medical supervision and skilled nursing care.",
            "$7,500-$11,000/mo",
        ),
        ServiceType::IndependentLiving => (
            "Independent Living",
            "Active communities with amenities and social activities.",
            "$2,500-$5,000/mo",
        ),
        ServiceType::Ccrc => (
            "Continuing Care Retirement Community",
            "Multiple levels of care allowing residents to transition as needs change.",
            "$3,000-$6,000/mo + Entrance Fee",
        ),
        ServiceType::AdultDayCare => (
            "Adult Day Care",
            "Daytime supervision and activities for seniors who live with family.",
            "$60-$120/day",
        ),
        ServiceType::HomeCare => (
            "In-Home Care",
            "Services provided in the senior's own home.",
            "$25-$40/hour",
        ),
        ServiceType::RespiteCare => (
            "Respite Care",
            "Short-term care to give primary caregivers a break.",
            "$150-$300/day",
        ),
        ServiceType::Hospice => (
            "Hospice Care",
            "End-of-life care focused on comfort and quality of life.",
            "Often covered by Medicare",
        ),
        ServiceType::Rehabilitation => (
            "Rehabilitation Centers",
            "Short-term intensive therapy following surgery, injury, or illness.",
            "$300-$600/day",
        ),
    };
    ServiceTypeInfo {
        id: service_type,
        name,
        description,
        price_range,
        slug: service_type.slug(),
    }
}

/// The full catalog in declaration order.
pub fn service_types() -> Vec<ServiceTypeInfo> {
    ServiceType::ALL.into_iter().map(service_type_info).collect()
}
