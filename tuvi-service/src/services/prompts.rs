//! Prompt templates sent to the generative model.
//!
//! Both templates ask the model for a bare JSON object. The reply is not
//! checked against that shape; callers pass it through as text.

use crate::models::{Hexagram, LunarDate, ReadingPeriod, UserInfo};

/// Keys requested from the model for a trigram reading.
pub const READING_SECTIONS: [&str; 5] = [
    "van_so_chung",
    "cong_viec_su_nghiep",
    "tinh_cam_moi_quan_he",
    "suc_khoe_tai_chinh",
    "loi_khuyen_cu_the",
];

/// Keys requested from the model for a chart analysis.
pub const CHART_SECTIONS: [&str; 4] = [
    "tong_quan_van_menh",
    "cong_danh_su_nghiep",
    "tinh_duyen_hon_nhan",
    "gia_dao_suc_khoe_tai_chinh",
];

pub fn compose_reading_prompt(user: &UserInfo, hexagram: &Hexagram, period: ReadingPeriod) -> String {
    format!(
        r#"Bạn là một chuyên gia Kinh Dịch. Dưới đây là thông tin người dùng:

- Họ và tên: {name}
- Ngày sinh: {birth_date}
- Giờ sinh: {birth_time}

Hãy luận giải quẻ {hexagram} ({meaning}) cho giai đoạn {period} tới dựa trên thông tin cá nhân của họ.

Hãy trả lời theo đúng định dạng JSON sau (không thêm bất kỳ text nào khác ngoài JSON):

{{
  "van_so_chung": "Phân tích vận số tổng quát cho giai đoạn này...",
  "cong_viec_su_nghiep": "Lời khuyên về công việc và sự nghiệp...",
  "tinh_cam_moi_quan_he": "Phân tích về tình cảm và các mối quan hệ...",
  "suc_khoe_tai_chinh": "Lời khuyên về sức khỏe và tài chính...",
  "loi_khuyen_cu_the": "Những lời khuyên cụ thể và hướng dẫn thực tế..."
}}

Mỗi phần cần:
- Dựa trên ý nghĩa quẻ {hexagram}
- Chi tiết và có thể áp dụng
- Dễ hiểu bằng tiếng Việt
- Dài khoảng 80-120 từ mỗi khía cạnh"#,
        name = user.name,
        birth_date = user.birth_date,
        birth_time = user.birth_time,
        hexagram = hexagram.name,
        meaning = hexagram.meaning,
        period = period.label(),
    )
}

/// Instruction that accompanies the uploaded chart image.
pub fn compose_chart_analysis_prompt(user: &UserInfo, lunar: &LunarDate) -> String {
    format!(
        r#"Tôi có một lá số tử vi cần được phân tích chi tiết. Thông tin người cần luận giải như sau:

Họ và tên: {name}

Ngày tháng năm sinh (Dương lịch): {birth_date}

Giờ sinh: {birth_time}

Ngày tháng năm sinh (Âm lịch): {lunar}

Tôi đã đính kèm hình ảnh lá số tử vi. Hãy căn cứ hoàn toàn vào các dữ liệu, cung mệnh, các sao và cách cục xuất hiện trong hình ảnh lá số tử vi đính kèm để đưa ra lý giải chi tiết về các khía cạnh sau đây:

Hãy trả lời theo đúng định dạng JSON sau (không thêm bất kỳ text nào khác ngoài JSON):

{{
  "tong_quan_van_menh": "Phân tích tổng quan về vận mệnh cuộc đời dựa trên cung mệnh, các sao chính, cách cục trong lá số...",
  "cong_danh_su_nghiep": "Phân tích về công danh, sự nghiệp dựa trên cung quan lộc, các sao liên quan...",
  "tinh_duyen_hon_nhan": "Phân tích về tình duyên, hôn nhân dựa trên cung phu thê, các sao tình duyên...",
  "gia_dao_suc_khoe_tai_chinh": "Phân tích về gia đạo, sức khỏe và tài chính dựa trên các cung liên quan và sao chiếu mệnh..."
}}

Mỗi phần phân tích cần:
- Dựa trên giải thích rõ ràng về cung, sao, cách cục
- Chi tiết, chuyên nghiệp
- Dễ hiểu bằng tiếng Việt
- Dài khoảng 200-300 từ mỗi khía cạnh"#,
        name = user.name,
        birth_date = user.birth_date,
        birth_time = user.birth_time,
        lunar = lunar.numeric(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::hexagram::HEXAGRAMS;

    fn user() -> UserInfo {
        UserInfo {
            name: "Trần Thị Bích".to_string(),
            birth_date: "1995-10-03".to_string(),
            birth_time: "14:45".to_string(),
        }
    }

    #[test]
    fn reading_prompt_embeds_user_and_hexagram() {
        let hexagram = &HEXAGRAMS[3];
        let prompt = compose_reading_prompt(&user(), hexagram, ReadingPeriod::Month);

        assert!(prompt.contains("Trần Thị Bích"));
        assert!(prompt.contains("1995-10-03"));
        assert!(prompt.contains("14:45"));
        assert!(prompt.contains("quẻ Khảm (Nước)"));
        assert!(prompt.contains("giai đoạn 1 tháng tới"));
        for key in READING_SECTIONS {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn period_label_follows_requested_period() {
        let hexagram = &HEXAGRAMS[0];

        assert!(compose_reading_prompt(&user(), hexagram, ReadingPeriod::Week).contains("1 tuần"));
        assert!(compose_reading_prompt(&user(), hexagram, ReadingPeriod::Year).contains("1 năm"));
    }

    #[test]
    fn chart_prompt_embeds_solar_and_lunar_dates() {
        let lunar = LunarDate {
            day: 9,
            month: 8,
            year: 1995,
            is_leap_month: true,
        };
        let prompt = compose_chart_analysis_prompt(&user(), &lunar);

        assert!(prompt.contains("Ngày tháng năm sinh (Dương lịch): 1995-10-03"));
        assert!(prompt.contains("Ngày tháng năm sinh (Âm lịch): 9/8/1995"));
        assert!(prompt.contains("Giờ sinh: 14:45"));
        for key in CHART_SECTIONS {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn composition_is_deterministic() {
        let hexagram = &HEXAGRAMS[5];
        assert_eq!(
            compose_reading_prompt(&user(), hexagram, ReadingPeriod::Week),
            compose_reading_prompt(&user(), hexagram, ReadingPeriod::Week)
        );
    }
}
