//! The form for recording and editing expenses.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    expense::MAX_EXPENSE_AMOUNT,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_GROUP_STYLE, FORM_CHECKBOX_INPUT_STYLE,
        FORM_CHECKBOX_LABEL_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    member::{Member, MemberId},
    settlement::Amount,
};

/// Form data for creating or updating an expense.
///
/// `target_ids` is sent once per checked box, so it must be parsed with
/// [axum_extra::extract::Form].
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: Amount,
    pub payer_id: MemberId,
    #[serde(default)]
    pub target_ids: Vec<MemberId>,
}

/// How the expense form is submitted.
pub(crate) enum ExpenseFormAction<'a> {
    /// POST to the endpoint for recording a new expense.
    Create(&'a str),
    /// PUT to the endpoint for updating an existing expense.
    Update(&'a str),
}

/// The values to pre-fill the expense form with.
pub(crate) struct ExpenseFormView<'a> {
    pub action: ExpenseFormAction<'a>,
    pub members: &'a [Member],
    pub description: &'a str,
    pub amount: Option<Amount>,
    pub payer_id: Option<MemberId>,
    /// The members to tick, or `None` to tick every member.
    pub target_ids: Option<&'a [MemberId]>,
}

impl ExpenseFormView<'_> {
    pub fn into_html(self) -> Markup {
        let (hx_post, hx_put, submit_text) = match self.action {
            ExpenseFormAction::Create(endpoint) => (Some(endpoint), None, "Add Expense"),
            ExpenseFormAction::Update(endpoint) => (None, Some(endpoint), "Save Changes"),
        };
        let is_target = |member_id: MemberId| {
            self.target_ids
                .is_none_or(|target_ids| target_ids.contains(&member_id))
        };

        html! {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="Dinner"
                        value=(self.description)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="amount"
                            type="number"
                            name="amount"
                            min="1"
                            max=(MAX_EXPENSE_AMOUNT)
                            step="1"
                            placeholder="0"
                            value=[self.amount]
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="payer_id" class=(FORM_LABEL_STYLE) { "Paid by" }

                    select
                        id="payer_id"
                        name="payer_id"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for member in self.members {
                            option
                                value=(member.id)
                                selected[self.payer_id == Some(member.id)]
                            {
                                (member.name)
                            }
                        }
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Split between" }

                    div class=(FORM_CHECKBOX_GROUP_STYLE)
                    {
                        @for member in self.members {
                            @let input_id = format!("target-{}", member.id);

                            div
                            {
                                input
                                    id=(input_id)
                                    type="checkbox"
                                    name="target_ids"
                                    value=(member.id)
                                    checked[is_target(member.id)]
                                    class=(FORM_CHECKBOX_INPUT_STYLE);

                                label for=(input_id) class=(FORM_CHECKBOX_LABEL_STYLE)
                                {
                                    (member.name)
                                }
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
            }
        }
    }
}
