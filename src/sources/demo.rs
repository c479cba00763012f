use serde_json::json;

use crate::constants;
use crate::error::Result;
use crate::types::{CompanySource, RawRecord};

/// Fixture collector standing in for the live scrapers. The records mirror
/// what the listing sites and registry feeds actually return, dirty variants
/// included: duplicated entities under different spellings, revenue as
/// free text, stray markup, sub-threshold companies.
pub struct DemoRosterSource;

impl DemoRosterSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DemoRosterSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompanySource for DemoRosterSource {
    fn source_name(&self) -> &'static str {
        constants::DEMO_SOURCE
    }

    async fn fetch_companies(&self) -> Result<Vec<RawRecord>> {
        Ok(vec![
            json!({
                "name": "LBL",
                "inn": "7707083893",
                "revenue": 986_900_000,
                "revenue_year": 2024,
                "segment_tag": "BTL",
                "source": "marketing-tech.ru",
                "okved_main": "73.11",
                "employees": 250,
                "site": "https://lbl.ru",
                "description": "Одно из крупнейших BTL агентств России, специализирующееся на промо-акциях и активации брендов",
                "region": "Москва",
                "contacts": "+7 (495) 123-45-67",
                "rating_ref": "https://marketing-tech.ru/companies/lbl/"
            }),
            // The same agency as the rating site lists it
            json!({
                "name": "ООО \"ЛБЛ\"",
                "inn": "7707083893",
                "revenue": "986.9 млн",
                "segment_tag": "BTL",
                "source": "www.alladvertising.ru/top/btl/",
                "region": "москва"
            }),
            json!({
                "name": "DDVB",
                "inn": "7701234567",
                "revenue": 227_300_000,
                "revenue_year": 2024,
                "segment_tag": "BTL",
                "source": "marketing-tech.ru",
                "okved_main": "73.11",
                "employees": 150,
                "site": "https://ddvb.ru",
                "description": "BTL агентство полного цикла, специализирующееся на промо-акциях и мерчендайзинге",
                "region": "Москва",
                "contacts": "info@ddvb.ru",
                "rating_ref": "https://marketing-tech.ru/companies/ddvb/"
            }),
            json!({
                "name": "emg",
                "inn": "7707123456",
                "revenue": "520 млн",
                "revenue_year": 2024,
                "segment_tag": "FULL_CYCLE",
                "source": "www.alladvertising.ru/top100/",
                "okved_main": "73.11",
                "employees": "300 сотрудников",
                "site": "https://emg.ru",
                "description": "Крупнейшее российское агентство интегрированных маркетинговых коммуникаций",
                "region": "Москва",
                "contacts": "+7 (495) 234-56-78",
                "rating_ref": "https://www.alladvertising.ru/info/emg.html"
            }),
            json!({
                "name": "Креон",
                "inn": "7701345678",
                "revenue": 340_000_000,
                "revenue_year": 2024,
                "segment_tag": "BTL",
                "source": "www.alladvertising.ru/top/btl/",
                "okved_main": "73.11",
                "employees": 180,
                "site": "https://creon.ru",
                "description": "Агентство BTL и событийного маркетинга, организация масштабных мероприятий",
                "region": "Москва",
                "contacts": "contact@creon.ru",
                "rating_ref": "https://www.alladvertising.ru/info/creon.html"
            }),
            // Listing entries for the same name without a tax id; these merge
            // with each other but never with the keyed record above
            json!({
                "name": "ООО «Креон»",
                "revenue": 0,
                "segment_tag": "EVENT",
                "source": "marketing-tech.ru",
                "description": "Креон — агентство событийного маркетинга полного цикла",
                "region": "Москва"
            }),
            json!({
                "name": "Креон",
                "source": "list-org.com",
                "contacts": "+7 (495) 987-65-43"
            }),
            json!({
                "name": "Оазис",
                "inn": "7801234567",
                "revenue": 420_000_000,
                "revenue_year": 2024,
                "segment_tag": "SOUVENIR",
                "source": "www.alladvertising.ru/top/gifts/",
                "okved_main": "47.78.3",
                "employees": 200,
                "site": "https://oasis-gifts.ru",
                "description": "Ведущий поставщик сувенирной продукции и бизнес-подарков в России",
                "region": "Санкт-Петербург",
                "contacts": "info@oasis-gifts.ru",
                "rating_ref": "https://www.alladvertising.ru/info/oasis_business_gifts.html"
            }),
            json!({
                "name": "N:OW",
                "inn": "7707456789",
                "revenue": 390_000_000,
                "revenue_year": 2024,
                "segment_tag": "EVENT",
                "source": "www.alladvertising.ru/top/event/",
                "okved_main": "82.30",
                "employees": 160,
                "site": "https://now-agency.ru",
                "description": "Event агентство полного цикла, организация корпоративных и специальных мероприятий",
                "region": "Москва",
                "contacts": "+7 (495) 456-78-90",
                "rating_ref": "https://www.alladvertising.ru/info/now_agency.html"
            }),
            json!({
                "name": "REMAR Group",
                "inn": "7707654321",
                "revenue": 310_000_000,
                "revenue_year": 2024,
                "segment_tag": "FULL_CYCLE",
                "source": "www.alladvertising.ru/top100/",
                "okved_main": "73.11",
                "employees": 220,
                "site": "https://remar.ru",
                "description": "Агентство полного цикла: BTL, Event-management, сувенирная продукция, digital",
                "region": "Москва",
                "contacts": "hello@remar.ru",
                "rating_ref": "https://www.alladvertising.ru/info/remar.html"
            }),
            json!({
                "name": "Master In",
                "inn": "7812345678",
                "revenue": 298_400_000,
                "revenue_year": 2024,
                "segment_tag": "BTL",
                "source": "marketing-tech.ru",
                "okved_main": "73.11",
                "employees": 140,
                "site": "https://master-in.ru",
                "description": "Специализация на промо-кампаниях в бизнес-центрах и университетах",
                "region": "Санкт-Петербург",
                "contacts": "+7 (812) 567-89-01",
                "rating_ref": "https://marketing-tech.ru/companies/master-in/"
            }),
            json!({
                "name": "BrandNew",
                "inn": "7707789012",
                "revenue": 235_000_000,
                "revenue_year": 2024,
                "segment_tag": "BTL",
                "source": "www.alladvertising.ru/top/btl/",
                "okved_main": "73.11",
                "employees": 95,
                "site": "https://brandnew.ru",
                "description": "Специальные мероприятия для привлечения аудитории и стимулирования продаж",
                "region": "Москва",
                "contacts": "info@brandnew.ru",
                "rating_ref": "https://www.alladvertising.ru/info/brandnew.html"
            }),
            // Known revenue under the floor: dropped by the validity gate
            json!({
                "name": "Промо Лидер",
                "inn": "7734567890",
                "revenue": 50_000_000,
                "segment_tag": "PROMO",
                "source": "list-org.com",
                "region": "Казань"
            }),
            // Unparsable revenue string: kept with revenue treated as unknown
            json!({
                "name": "Ивент Студия",
                "revenue": "нет данных",
                "segment_tag": "EVENT",
                "source": "marketing-tech.ru",
                "region": "Екатеринбург",
                "contacts": "studio@eventstudio.ru"
            }),
            // Markup only; no usable name survives cleaning
            json!({
                "name": "<img src=\"logo.png\"/> ",
                "source": "www.alladvertising.ru/top/btl/"
            }),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_source_yields_fixture_batch() {
        let source = DemoRosterSource::new();
        assert_eq!(source.source_name(), constants::DEMO_SOURCE);

        let records = source.fetch_companies().await.unwrap();
        assert_eq!(records.len(), 15);
        // Duplicated entity is present under both spellings
        let lbl_count = records
            .iter()
            .filter(|r| r["inn"] == "7707083893")
            .count();
        assert_eq!(lbl_count, 2);
    }
}
